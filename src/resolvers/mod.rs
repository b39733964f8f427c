//! Resolvers for each market question family
//!
//! One resolver per question family, each built from its slice of the
//! config. `resolve_market` dispatches on the market's resolver kind and
//! maps the evaluated outcome through the market's code map. A source error
//! that survives the retry policy becomes the market's `on_error` code; a
//! recommendation is always produced.

pub mod dex_price;
pub mod game_winner;
pub mod match_winner;
pub mod price_threshold;

pub use dex_price::DexPriceResolver;
pub use game_winner::GameWinnerResolver;
pub use match_winner::MatchWinnerResolver;
pub use price_threshold::PriceThresholdResolver;

use crate::config::Config;
use crate::market::{MarketSpec, ResolverSpec};
use crate::sources::SourceError;
use crate::types::{Outcome, Resolution};
use chrono::Utc;
use tracing::{debug, error, info};

/// Resolve a market to a recommendation.
///
/// This never fails: errors are logged and converted to the market's
/// configured fallback code.
pub async fn resolve_market(spec: &MarketSpec, config: &Config) -> Resolution {
    match spec.close_time_utc() {
        Ok(Some(close)) if Utc::now() < close => {
            debug!("\"{}\" closes at {}; resolving before close", spec.question, close);
        }
        Err(err) => {
            // A bad close_time is metadata only; the resolver decides timing
            debug!("\"{}\" has unparseable close_time: {}", spec.question, err);
        }
        _ => {}
    }

    match evaluate(spec, config).await {
        Ok((outcome, source, reason)) => {
            info!("\"{}\" -> {} ({})", spec.question, outcome, reason);
            Resolution::new(spec.codes.code_for(outcome), source, reason)
        }
        Err(err) => {
            error!("Resolution failed for \"{}\": {}", spec.question, err);
            Resolution::new(
                spec.codes.on_error,
                "fallback",
                format!("resolution failed: {}", err),
            )
        }
    }
}

/// Run the resolver matching the market's kind
async fn evaluate(
    spec: &MarketSpec,
    config: &Config,
) -> Result<(Outcome, &'static str, String), SourceError> {
    match &spec.resolver {
        ResolverSpec::PriceThreshold {
            symbol,
            interval,
            threshold,
            comparison,
            mode,
            window_start,
            window_end,
        } => {
            let resolver = PriceThresholdResolver::new(config);
            let (outcome, reason) = resolver
                .resolve(symbol, interval, *threshold, *comparison, *mode, *window_start, *window_end)
                .await?;
            Ok((outcome, "binance", reason))
        }

        ResolverSpec::GameWinner { league, date, first_team, second_team } => {
            let resolver = GameWinnerResolver::new(config);
            let (outcome, reason) = resolver
                .resolve(league, *date, first_team, second_team)
                .await?;
            Ok((outcome, "sportsdataio", reason))
        }

        ResolverSpec::DexPrice { chain, pair_address, threshold, comparison, min_liquidity_usd } => {
            let resolver = DexPriceResolver::new(config);
            let (outcome, reason) = resolver
                .resolve(chain, pair_address, *threshold, *comparison, *min_liquidity_usd)
                .await?;
            Ok((outcome, "dexscreener", reason))
        }

        ResolverSpec::MatchWinner { event_url, first_team, second_team } => {
            let resolver = MatchWinnerResolver::new(config);
            let (outcome, reason) = resolver
                .resolve(event_url, first_team, second_team)
                .await?;
            Ok((outcome, "hltv", reason))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Recommendation;

    #[tokio::test]
    async fn test_error_maps_to_on_error_code() {
        // Sports resolver with no API key fails before any network call
        let spec: MarketSpec = serde_json::from_str(
            r#"{
                "question": "Chiefs vs Bills",
                "resolver": {
                    "kind": "game_winner",
                    "league": "nfl",
                    "date": "2025-01-12",
                    "first_team": "KC",
                    "second_team": "BUF"
                },
                "codes": { "on_error": "p3" }
            }"#,
        )
        .unwrap();

        let config = Config::default();
        let resolution = resolve_market(&spec, &config).await;
        assert_eq!(resolution.recommendation, Recommendation::P3);
        assert_eq!(resolution.source, "fallback");
    }
}
