//! Configuration management for the resolver

use crate::services::RetryConfig;
use std::env;

/// Resolver configuration loaded from environment
#[derive(Debug, Clone)]
pub struct Config {
    /// SportsDataIO API key (required only by game-winner markets)
    pub sportsdata_api_key: Option<String>,

    /// Extra Binance base URL tried before the public fallback chain
    pub binance_api_base: Option<String>,

    /// HTTP request timeout in seconds
    pub http_timeout_secs: u64,

    /// Retry policy for data-source calls
    pub retry: RetryConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let sportsdata_api_key = env::var("SPORTSDATA_API_KEY").ok().filter(|s| !s.is_empty());

        let binance_api_base = env::var("BINANCE_API_BASE").ok().filter(|s| !s.is_empty());

        let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let mut retry = RetryConfig::default();
        if let Some(max) = env::var("MAX_RETRIES").ok().and_then(|v| v.parse().ok()) {
            retry.max_retries = max;
        }
        if let Some(ms) = env::var("RETRY_INITIAL_DELAY_MS").ok().and_then(|v| v.parse().ok()) {
            retry.initial_delay_ms = ms;
        }
        if let Some(ms) = env::var("RETRY_MAX_DELAY_MS").ok().and_then(|v| v.parse().ok()) {
            retry.max_delay_ms = ms;
        }
        if let Some(ms) = env::var("RETRY_RATE_LIMIT_FLOOR_MS").ok().and_then(|v| v.parse().ok()) {
            retry.rate_limit_floor_ms = ms;
        }

        Self {
            sportsdata_api_key,
            binance_api_base,
            http_timeout_secs,
            retry,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sportsdata_api_key: None,
            binance_api_base: None,
            http_timeout_secs: 30,
            retry: RetryConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.http_timeout_secs, 30);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.rate_limit_floor_ms, 1000);
        assert!(config.sportsdata_api_key.is_none());
    }
}
