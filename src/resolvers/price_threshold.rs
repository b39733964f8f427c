//! Crypto price-threshold resolver
//!
//! "Will BTC close above $100K on June 30?" style questions, answered from
//! Binance candles over the market's time window. Two reading modes:
//! `final_close` compares the close of the last completed candle in the
//! window, `touch` resolves as soon as any candle's extreme crosses the
//! threshold.

use crate::config::Config;
use crate::market::ThresholdMode;
use crate::services::with_retry;
use crate::sources::binance::Kline;
use crate::sources::{BinanceClient, SourceError};
use crate::types::{Comparison, Outcome};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

pub struct PriceThresholdResolver {
    client: BinanceClient,
    retry: crate::services::RetryConfig,
}

impl PriceThresholdResolver {
    pub fn new(config: &Config) -> Self {
        Self {
            client: BinanceClient::new(config.http_timeout_secs, config.binance_api_base.clone()),
            retry: config.retry.clone(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn resolve(
        &self,
        symbol: &str,
        interval: &str,
        threshold: Decimal,
        comparison: Comparison,
        mode: ThresholdMode,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<(Outcome, String), SourceError> {
        let now = Utc::now();
        // Never ask Binance for candles from the future
        let fetch_end = window_end.min(now);

        let klines = if fetch_end <= window_start {
            Vec::new()
        } else {
            with_retry(&self.retry, "binance klines", || {
                self.client.fetch_klines(symbol, interval, window_start, fetch_end)
            })
            .await?
        };

        Ok(decide(&klines, threshold, comparison, mode, window_end, now))
    }
}

/// Pure decision over fetched candles
pub fn decide(
    klines: &[Kline],
    threshold: Decimal,
    comparison: Comparison,
    mode: ThresholdMode,
    window_end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> (Outcome, String) {
    match mode {
        ThresholdMode::Touch => decide_touch(klines, threshold, comparison, window_end, now),
        ThresholdMode::FinalClose => decide_final_close(klines, threshold, comparison, window_end, now),
    }
}

fn decide_touch(
    klines: &[Kline],
    threshold: Decimal,
    comparison: Comparison,
    window_end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> (Outcome, String) {
    // The candle extreme on the threshold side decides whether it was touched
    for kline in klines {
        let extreme = match comparison {
            Comparison::Above | Comparison::AtOrAbove => kline.high,
            Comparison::Below | Comparison::AtOrBelow => kline.low,
        };
        if comparison.holds(extreme, threshold) {
            return (
                Outcome::First,
                format!(
                    "price touched {} {} at candle {} (extreme {})",
                    comparison, threshold, kline.open_time, extreme
                ),
            );
        }
    }

    if now < window_end {
        (
            Outcome::TooEarly,
            format!("threshold not touched yet; window open until {}", window_end),
        )
    } else if klines.is_empty() {
        // An empty feed is absence of evidence, not a missed threshold
        (
            Outcome::Unknown,
            "no candles returned for closed window".to_string(),
        )
    } else {
        (
            Outcome::Second,
            format!("window closed without price {} {}", comparison, threshold),
        )
    }
}

fn decide_final_close(
    klines: &[Kline],
    threshold: Decimal,
    comparison: Comparison,
    window_end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> (Outcome, String) {
    if now < window_end {
        return (
            Outcome::TooEarly,
            format!("window open until {}", window_end),
        );
    }

    // Last candle fully completed inside the window
    let last = klines
        .iter()
        .filter(|k| k.close_time <= window_end)
        .max_by_key(|k| k.close_time);

    match last {
        Some(kline) => {
            let holds = comparison.holds(kline.close, threshold);
            let outcome = if holds { Outcome::First } else { Outcome::Second };
            (
                outcome,
                format!(
                    "final close {} at {} is{} {} {}",
                    kline.close,
                    kline.close_time,
                    if holds { "" } else { " not" },
                    comparison,
                    threshold
                ),
            )
        }
        None => (
            Outcome::Unknown,
            "no completed candles in window".to_string(),
        ),
    }
}
