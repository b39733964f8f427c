//! Declarative market definitions
//!
//! One JSON file per market question. The `resolver` payload is tagged by
//! `kind` and selects which data source answers the question; the `codes`
//! map decides which recommendation code each outcome prints.

use crate::types::{Comparison, Outcome, Recommendation};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

/// Default timezone for date-only deadlines (prediction-market convention)
const DEFAULT_TIMEZONE: Tz = chrono_tz::America::New_York;

/// A market question and how to resolve it
#[derive(Debug, Clone, Deserialize)]
pub struct MarketSpec {
    /// Market question text, for the log only
    pub question: String,

    /// When the market closes. RFC 3339 timestamp, or a bare date that is
    /// interpreted as end-of-day in `timezone`.
    #[serde(default)]
    pub close_time: Option<String>,

    /// IANA timezone for date-only `close_time` values (default: America/New_York)
    #[serde(default)]
    pub timezone: Option<String>,

    pub resolver: ResolverSpec,

    #[serde(default)]
    pub codes: OutcomeCodes,
}

/// Resolver selection, tagged by `kind`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolverSpec {
    /// Did a Binance symbol cross a price threshold in a time window?
    PriceThreshold {
        /// Binance symbol, e.g. "BTCUSDT"
        symbol: String,
        /// Kline interval (default "1h")
        #[serde(default = "default_interval")]
        interval: String,
        threshold: Decimal,
        comparison: Comparison,
        #[serde(default)]
        mode: ThresholdMode,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    },

    /// Which team won a scheduled game? (SportsDataIO)
    GameWinner {
        /// League slug as used by the scores API, e.g. "nfl", "nba"
        league: String,
        /// Game date in the league's local schedule
        date: NaiveDate,
        /// Team mapped to the `first` outcome (name or API key)
        first_team: String,
        /// Team mapped to the `second` outcome
        second_team: String,
    },

    /// Is a DEX pair's spot price past a threshold? (DexScreener)
    DexPrice {
        /// Chain identifier, e.g. "solana", "ethereum"
        chain: String,
        pair_address: String,
        threshold: Decimal,
        comparison: Comparison,
        /// Pools below this USD liquidity do not resolve the market
        #[serde(default = "default_min_liquidity")]
        min_liquidity_usd: Decimal,
    },

    /// Which team won an esports match? (HLTV event results)
    MatchWinner {
        /// Full URL of the event results page
        event_url: String,
        first_team: String,
        second_team: String,
    },
}

/// How a price-threshold question reads the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// Compare the close of the last candle in the window
    #[default]
    FinalClose,
    /// Resolve first outcome if any candle's high/low crosses the threshold
    Touch,
}

/// Outcome-to-code mapping, all slots overridable per market
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct OutcomeCodes {
    pub first: Recommendation,
    pub second: Recommendation,
    pub unknown: Recommendation,
    pub too_early: Recommendation,
    /// Printed when resolution fails after retries
    pub on_error: Recommendation,
}

impl Default for OutcomeCodes {
    fn default() -> Self {
        Self {
            first: Recommendation::P1,
            second: Recommendation::P2,
            unknown: Recommendation::P3,
            too_early: Recommendation::P4,
            on_error: Recommendation::P4,
        }
    }
}

impl OutcomeCodes {
    /// Map an evaluated outcome to its recommendation code
    pub fn code_for(&self, outcome: Outcome) -> Recommendation {
        match outcome {
            Outcome::First => self.first,
            Outcome::Second => self.second,
            Outcome::Unknown => self.unknown,
            Outcome::TooEarly => self.too_early,
        }
    }
}

impl MarketSpec {
    /// Load a market definition from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read market file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse market file {}", path.display()))
    }

    /// Market close time as UTC, if declared.
    ///
    /// Accepts a full RFC 3339 timestamp, or a bare date interpreted as
    /// 23:59:59 in the market's timezone.
    pub fn close_time_utc(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = &self.close_time else {
            return Ok(None);
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Some(dt.with_timezone(&Utc)));
        }

        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("Unparseable close_time: {}", raw))?;

        let tz: Tz = match &self.timezone {
            Some(name) => name
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid timezone {}: {}", name, e))?,
            None => DEFAULT_TIMEZONE,
        };

        let end_of_day = date.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap());
        let local = tz
            .from_local_datetime(&end_of_day)
            .earliest()
            .ok_or_else(|| anyhow::anyhow!("close_time {} is not valid in {}", raw, tz))?;

        Ok(Some(local.with_timezone(&Utc)))
    }
}

fn default_interval() -> String {
    "1h".to_string()
}

fn default_min_liquidity() -> Decimal {
    Decimal::from(1000)
}
