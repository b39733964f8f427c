//! DEX spot-price resolver
//!
//! "Is token X trading above $Y?" style questions, answered from the
//! DexScreener pair endpoint at resolution time. A pool below the liquidity
//! floor does not resolve the market: thin-pool prints are not a price.

use crate::config::Config;
use crate::services::with_retry;
use crate::sources::dexscreener::Pair;
use crate::sources::{DexScreenerClient, SourceError};
use crate::types::{Comparison, Outcome};
use rust_decimal::Decimal;

pub struct DexPriceResolver {
    client: DexScreenerClient,
    retry: crate::services::RetryConfig,
}

impl DexPriceResolver {
    pub fn new(config: &Config) -> Self {
        Self {
            client: DexScreenerClient::new(config.http_timeout_secs),
            retry: config.retry.clone(),
        }
    }

    pub async fn resolve(
        &self,
        chain: &str,
        pair_address: &str,
        threshold: Decimal,
        comparison: Comparison,
        min_liquidity_usd: Decimal,
    ) -> Result<(Outcome, String), SourceError> {
        let pair = with_retry(&self.retry, "dexscreener pair", || {
            self.client.fetch_pair(chain, pair_address)
        })
        .await?;

        Ok(decide(&pair, threshold, comparison, min_liquidity_usd))
    }
}

/// Pure decision over the fetched pair
pub fn decide(
    pair: &Pair,
    threshold: Decimal,
    comparison: Comparison,
    min_liquidity_usd: Decimal,
) -> (Outcome, String) {
    let liquidity = pair.liquidity_usd().unwrap_or_default();
    if liquidity < min_liquidity_usd {
        return (
            Outcome::Unknown,
            format!("pool liquidity ${} below ${} floor", liquidity, min_liquidity_usd),
        );
    }

    let Some(price) = pair.price() else {
        return (Outcome::Unknown, "pair has no USD price".to_string());
    };

    if comparison.holds(price, threshold) {
        (Outcome::First, format!("price {} is {} {}", price, comparison, threshold))
    } else {
        (Outcome::Second, format!("price {} is not {} {}", price, comparison, threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pair(json: &str) -> Pair {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_price_above_threshold() {
        let p = pair(r#"{"priceUsd": "0.0150", "liquidity": {"usd": 50000.0}}"#);
        let (outcome, _) = decide(&p, dec!(0.01), Comparison::Above, dec!(1000));
        assert_eq!(outcome, Outcome::First);
    }

    #[test]
    fn test_price_below_threshold() {
        let p = pair(r#"{"priceUsd": "0.0050", "liquidity": {"usd": 50000.0}}"#);
        let (outcome, _) = decide(&p, dec!(0.01), Comparison::Above, dec!(1000));
        assert_eq!(outcome, Outcome::Second);
    }

    #[test]
    fn test_thin_pool_does_not_resolve() {
        let p = pair(r#"{"priceUsd": "5.00", "liquidity": {"usd": 120.0}}"#);
        let (outcome, reason) = decide(&p, dec!(0.01), Comparison::Above, dec!(1000));
        assert_eq!(outcome, Outcome::Unknown);
        assert!(reason.contains("liquidity"));
    }

    #[test]
    fn test_missing_price_is_unknown() {
        let p = pair(r#"{"liquidity": {"usd": 50000.0}}"#);
        let (outcome, _) = decide(&p, dec!(0.01), Comparison::Above, dec!(1000));
        assert_eq!(outcome, Outcome::Unknown);
    }

    #[test]
    fn test_missing_liquidity_counts_as_zero() {
        let p = pair(r#"{"priceUsd": "5.00"}"#);
        let (outcome, _) = decide(&p, dec!(0.01), Comparison::Above, dec!(1000));
        assert_eq!(outcome, Outcome::Unknown);
    }
}
