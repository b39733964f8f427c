//! DexScreener pairs client
//!
//! DEX price markets resolve against the pair endpoint. No API key. Prices
//! arrive string-encoded, liquidity as a float USD figure.

use super::SourceError;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::debug;

const BASE_URL: &str = "https://api.dexscreener.com/latest/dex";

#[derive(Debug, Deserialize)]
struct PairsResponse {
    #[serde(default)]
    pairs: Option<Vec<Pair>>,
    #[serde(default)]
    pair: Option<Pair>,
}

/// A single trading pair on a DEX
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    #[serde(default)]
    pub pair_address: Option<String>,
    #[serde(default)]
    pub price_usd: Option<String>,
    #[serde(default)]
    pub liquidity: Option<Liquidity>,
    #[serde(default)]
    pub base_token: Option<Token>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Liquidity {
    #[serde(default)]
    pub usd: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    #[serde(default)]
    pub symbol: Option<String>,
}

impl Pair {
    /// USD price as an exact decimal
    pub fn price(&self) -> Option<Decimal> {
        self.price_usd
            .as_deref()
            .and_then(|p| Decimal::from_str(p).ok())
    }

    /// Pool liquidity in USD
    pub fn liquidity_usd(&self) -> Option<Decimal> {
        self.liquidity
            .as_ref()
            .and_then(|l| l.usd)
            .and_then(|usd| Decimal::try_from(usd).ok())
    }
}

pub struct DexScreenerClient {
    client: Client,
}

impl DexScreenerClient {
    pub fn new(timeout_secs: u64) -> Self {
        Self { client: super::http_client(timeout_secs) }
    }

    /// Look up a pair by chain and pair address
    pub async fn fetch_pair(&self, chain: &str, pair_address: &str) -> Result<Pair, SourceError> {
        let url = format!("{}/pairs/{}/{}", BASE_URL, chain, pair_address);
        debug!("Fetching pair from {}", url);

        let response = self
            .client
            .get(&url)
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

        let parsed: PairsResponse = serde_json::from_str(&body)
            .map_err(|e| SourceError::MalformedResponse(format!("pair body: {}", e)))?;

        parsed
            .pair
            .or_else(|| parsed.pairs.and_then(|mut pairs| {
                if pairs.is_empty() { None } else { Some(pairs.remove(0)) }
            }))
            .ok_or_else(|| SourceError::NotFound(format!("pair {}/{}", chain, pair_address)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_pair_payload() {
        let parsed: PairsResponse = serde_json::from_str(
            r#"{
                "schemaVersion": "1.0.0",
                "pairs": [{
                    "pairAddress": "7xKX...",
                    "priceUsd": "0.012345",
                    "liquidity": { "usd": 152340.5, "base": 100.0, "quote": 50.0 },
                    "baseToken": { "symbol": "WIF" }
                }]
            }"#,
        )
        .unwrap();

        let pair = parsed.pairs.unwrap().remove(0);
        assert_eq!(pair.price().unwrap(), dec!(0.012345));
        assert_eq!(pair.liquidity_usd().unwrap(), dec!(152340.5));
        assert_eq!(pair.base_token.unwrap().symbol.as_deref(), Some("WIF"));
    }

    #[test]
    fn test_missing_price_is_none() {
        let pair: Pair = serde_json::from_str(r#"{"pairAddress": "abc"}"#).unwrap();
        assert!(pair.price().is_none());
        assert!(pair.liquidity_usd().is_none());
    }

    #[test]
    fn test_null_pairs_payload() {
        // DexScreener returns {"pairs": null} for unknown addresses
        let parsed: PairsResponse = serde_json::from_str(r#"{"pairs": null}"#).unwrap();
        assert!(parsed.pairs.is_none());
        assert!(parsed.pair.is_none());
    }
}
