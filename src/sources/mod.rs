//! Third-party data source clients
//!
//! Each client owns a reqwest client with a configured timeout and returns
//! `Result<_, SourceError>` so the retry layer can tell transient failures
//! from hard ones.

pub mod binance;
pub mod dexscreener;
pub mod hltv;
pub mod sportsdataio;

pub use binance::BinanceClient;
pub use dexscreener::DexScreenerClient;
pub use hltv::HltvClient;
pub use sportsdataio::SportsDataClient;

use serde::Deserialize;
use thiserror::Error;

/// Structured data-source error
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Rate limited by the upstream API
    #[error("Rate limited by upstream API")]
    RateLimited,
    /// Missing or rejected API key
    #[error("API authentication failed: {0}")]
    AuthenticationFailed(String),
    /// Requested entity does not exist upstream
    #[error("Not found: {0}")]
    NotFound(String),
    /// Response arrived but could not be interpreted
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    /// Network/connection error (timeout, DNS, etc.)
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Anything else the upstream returned
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
}

/// Common JSON error envelope returned by the upstream APIs
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

impl SourceError {
    /// Classify a non-success HTTP response
    pub fn from_response(status: u16, body: &str) -> Self {
        let error_msg = if let Ok(parsed) = serde_json::from_str::<ApiErrorResponse>(body) {
            parsed
                .error
                .or(parsed.message)
                .or(parsed.msg)
                .unwrap_or_else(|| body.to_string())
        } else {
            body.to_string()
        };

        let msg_lower = error_msg.to_lowercase();

        if status == 429 || msg_lower.contains("rate limit") || msg_lower.contains("too many requests") {
            return SourceError::RateLimited;
        }

        if status == 401
            || status == 403
            || msg_lower.contains("unauthorized")
            || msg_lower.contains("invalid api key")
            || msg_lower.contains("subscription")
        {
            return SourceError::AuthenticationFailed(error_msg);
        }

        if status == 404 {
            return SourceError::NotFound(error_msg);
        }

        SourceError::Api { status, body: error_msg }
    }

    /// Classify a network/reqwest error
    pub fn from_network_error(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::NetworkError("Request timed out".to_string())
        } else if err.is_connect() {
            SourceError::NetworkError("Connection failed".to_string())
        } else {
            SourceError::NetworkError(err.to_string())
        }
    }

    /// Whether this error is worth retrying with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, SourceError::RateLimited | SourceError::NetworkError(_))
    }
}

/// Build the shared HTTP client with the configured timeout
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent("market-resolver/0.1")
        .build()
        .expect("Failed to create HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_by_status() {
        let err = SourceError::from_response(429, "");
        assert!(err.is_retryable());
        assert!(matches!(err, SourceError::RateLimited));
    }

    #[test]
    fn test_rate_limited_by_message() {
        let err = SourceError::from_response(418, r#"{"msg":"Too many requests; banned"}"#);
        assert!(matches!(err, SourceError::RateLimited));
    }

    #[test]
    fn test_auth_failed_not_retryable() {
        let err = SourceError::from_response(401, r#"{"message":"Invalid API key"}"#);
        assert!(!err.is_retryable());
        assert!(matches!(err, SourceError::AuthenticationFailed(_)));
    }

    #[test]
    fn test_not_found() {
        let err = SourceError::from_response(404, r#"{"error":"no such pair"}"#);
        assert!(!err.is_retryable());
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[test]
    fn test_unclassified_server_error() {
        let err = SourceError::from_response(500, "Internal server error");
        assert!(!err.is_retryable());
        assert!(matches!(err, SourceError::Api { status: 500, .. }));
    }
}
