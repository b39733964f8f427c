//! Binance klines client
//!
//! Markets about spot prices resolve against Binance 1m-1d candles. The
//! public data endpoints need no API key but individual hosts get geo-blocked
//! or rate limited, so the client walks an ordered list of fallback base URLs.

use super::SourceError;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, warn};

/// Default fallback chain, in preference order
const DEFAULT_BASES: [&str; 3] = [
    "https://api.binance.com",
    "https://api1.binance.com",
    "https://data-api.binance.vision",
];

/// Max candles per request (Binance hard limit)
const KLINE_LIMIT: u32 = 1000;

/// Hard cap across all pages of one window. Wider windows error out instead
/// of resolving a market from a truncated read.
const MAX_KLINES: usize = 50_000;

/// One candle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kline {
    pub open_time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub close_time: DateTime<Utc>,
}

pub struct BinanceClient {
    client: Client,
    bases: Vec<String>,
}

impl BinanceClient {
    /// Create a client. `extra_base`, when set, is tried before the defaults.
    pub fn new(timeout_secs: u64, extra_base: Option<String>) -> Self {
        let mut bases: Vec<String> = Vec::new();
        if let Some(base) = extra_base {
            bases.push(base.trim_end_matches('/').to_string());
        }
        bases.extend(DEFAULT_BASES.iter().map(|b| b.to_string()));

        Self { client: super::http_client(timeout_secs), bases }
    }

    /// Fetch all candles for a symbol over a closed time window.
    ///
    /// One request returns at most 1000 candles, so long windows are paged:
    /// the cursor advances past the last candle's close until the window is
    /// covered or a short page signals the end of the data.
    pub async fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Kline>, SourceError> {
        let mut all = Vec::new();
        let mut cursor = start;

        loop {
            let batch = self.fetch_page(symbol, interval, cursor, end).await?;
            let batch_len = batch.len();
            all.extend(batch);

            if batch_len < KLINE_LIMIT as usize {
                break;
            }

            match next_page_start(&all) {
                Some(next) if next < end => cursor = next,
                _ => break,
            }

            if all.len() >= MAX_KLINES {
                return Err(SourceError::MalformedResponse(format!(
                    "window needs more than {} candles; widen the interval",
                    MAX_KLINES
                )));
            }
        }

        debug!("Fetched {} candles total for {}", all.len(), symbol);
        Ok(all)
    }

    /// Fetch one page of candles.
    ///
    /// Each base URL is tried in order; a retryable failure (network, rate
    /// limit) moves to the next base, anything else fails immediately.
    async fn fetch_page(
        &self,
        symbol: &str,
        interval: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Kline>, SourceError> {
        let mut last_err = SourceError::NetworkError("No Binance endpoint reachable".to_string());

        for base in &self.bases {
            let url = format!(
                "{}/api/v3/klines?symbol={}&interval={}&startTime={}&endTime={}&limit={}",
                base,
                symbol,
                interval,
                start.timestamp_millis(),
                end.timestamp_millis(),
                KLINE_LIMIT
            );
            debug!("Fetching klines from {}", url);

            match self.fetch_from(&url).await {
                Ok(klines) => {
                    debug!("Fetched page of {} candles for {} from {}", klines.len(), symbol, base);
                    return Ok(klines);
                }
                Err(err) if err.is_retryable() => {
                    warn!("Binance base {} failed ({}), trying next", base, err);
                    last_err = err;
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_err)
    }

    async fn fetch_from(&self, url: &str) -> Result<Vec<Kline>, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::from_network_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::from_network_error(&e))?;

        if !status.is_success() {
            return Err(SourceError::from_response(status.as_u16(), &body));
        }

        let rows: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| SourceError::MalformedResponse(format!("kline body not JSON: {}", e)))?;

        parse_klines(&rows)
    }
}

/// Start of the next page: just past the last fetched candle's close.
/// Binance returns candles in ascending open-time order.
fn next_page_start(klines: &[Kline]) -> Option<DateTime<Utc>> {
    klines
        .last()
        .map(|k| k.close_time + chrono::Duration::milliseconds(1))
}

/// Parse the heterogeneous kline rows Binance returns:
/// `[[openTime, "open", "high", "low", "close", "volume", closeTime, ...], ...]`
pub fn parse_klines(rows: &serde_json::Value) -> Result<Vec<Kline>, SourceError> {
    let rows = rows
        .as_array()
        .ok_or_else(|| SourceError::MalformedResponse("expected kline array".to_string()))?;

    rows.iter().map(parse_kline_row).collect()
}

fn parse_kline_row(row: &serde_json::Value) -> Result<Kline, SourceError> {
    let fields = row
        .as_array()
        .filter(|f| f.len() >= 7)
        .ok_or_else(|| SourceError::MalformedResponse("kline row too short".to_string()))?;

    let millis = |v: &serde_json::Value| -> Result<DateTime<Utc>, SourceError> {
        let ms = v
            .as_i64()
            .ok_or_else(|| SourceError::MalformedResponse("kline timestamp not an integer".to_string()))?;
        Utc.timestamp_millis_opt(ms)
            .single()
            .ok_or_else(|| SourceError::MalformedResponse(format!("kline timestamp out of range: {}", ms)))
    };

    let price = |v: &serde_json::Value| -> Result<Decimal, SourceError> {
        let s = v
            .as_str()
            .ok_or_else(|| SourceError::MalformedResponse("kline price not a string".to_string()))?;
        Decimal::from_str(s)
            .map_err(|e| SourceError::MalformedResponse(format!("bad kline price {}: {}", s, e)))
    };

    Ok(Kline {
        open_time: millis(&fields[0])?,
        open: price(&fields[1])?,
        high: price(&fields[2])?,
        low: price(&fields[3])?,
        close: price(&fields[4])?,
        close_time: millis(&fields[6])?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_kline_rows() {
        let body = serde_json::json!([
            [
                1719705600000i64, "61210.50", "61500.00", "61100.25", "61433.10",
                "1523.4", 1719709199999i64, "93321123.1", 42100, "700.1", "42912345.0", "0"
            ],
            [
                1719709200000i64, "61433.10", "61800.00", "61350.00", "61790.00",
                "1201.7", 1719712799999i64, "74212311.9", 38876, "610.2", "37612311.2", "0"
            ]
        ]);

        let klines = parse_klines(&body).unwrap();
        assert_eq!(klines.len(), 2);
        assert_eq!(klines[0].close, dec!(61433.10));
        assert_eq!(klines[1].high, dec!(61800.00));
        assert_eq!(klines[0].open_time, Utc.timestamp_millis_opt(1719705600000).unwrap());
    }

    #[test]
    fn test_parse_rejects_short_row() {
        let body = serde_json::json!([[1719705600000i64, "61210.50"]]);
        assert!(matches!(parse_klines(&body), Err(SourceError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let body = serde_json::json!({"code": -1121, "msg": "Invalid symbol."});
        assert!(parse_klines(&body).is_err());
    }

    #[test]
    fn test_next_page_start_advances_past_last_close() {
        let body = serde_json::json!([
            [
                1719705600000i64, "61210.50", "61500.00", "61100.25", "61433.10",
                "1523.4", 1719709199999i64, "93321123.1", 42100, "700.1", "42912345.0", "0"
            ]
        ]);
        let klines = parse_klines(&body).unwrap();
        let next = next_page_start(&klines).unwrap();
        assert_eq!(next, Utc.timestamp_millis_opt(1719709200000).unwrap());
    }

    #[test]
    fn test_next_page_start_empty_is_none() {
        assert!(next_page_start(&[]).is_none());
    }

    #[test]
    fn test_extra_base_is_preferred() {
        let client = BinanceClient::new(30, Some("https://proxy.example.com/".to_string()));
        assert_eq!(client.bases[0], "https://proxy.example.com");
        assert_eq!(client.bases[1], "https://api.binance.com");
    }
}
