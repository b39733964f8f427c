//! Bounded retry for data-source calls
//!
//! A market resolution is a one-shot read: a transient failure (rate limit,
//! dropped connection) is worth a few backed-off attempts, while a hard
//! failure (bad key, missing entity, garbage payload) should surface at once
//! so the market can fall back to its error code. Rate limits additionally
//! honor a minimum wait, since upstream throttle windows outlast the first
//! backoff steps.

use crate::sources::SourceError;
use std::future::Future;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Retry policy knobs
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts after the first failure
    pub max_retries: u32,
    /// First backoff delay in milliseconds
    pub initial_delay_ms: u64,
    /// Backoff ceiling in milliseconds
    pub max_delay_ms: u64,
    /// Multiplier applied to the delay after each failed attempt
    pub backoff_factor: f64,
    /// Minimum wait after a rate-limit response, regardless of backoff state
    pub rate_limit_floor_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
            backoff_factor: 2.0,
            rate_limit_floor_ms: 1000,
        }
    }
}

impl RetryConfig {
    /// Wait before the next attempt, given the current backoff delay and
    /// the error that triggered the retry
    fn wait_for(&self, err: &SourceError, backoff_ms: u64) -> u64 {
        match err {
            SourceError::RateLimited => backoff_ms.max(self.rate_limit_floor_ms),
            _ => backoff_ms,
        }
    }

    /// Next backoff delay, capped at the ceiling
    fn next_backoff(&self, backoff_ms: u64) -> u64 {
        ((backoff_ms as f64 * self.backoff_factor) as u64).min(self.max_delay_ms)
    }
}

/// Run a data-source call with the retry policy.
///
/// Retries only errors `SourceError::is_retryable` accepts; everything else
/// is returned to the caller on the first attempt.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    mut f: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut attempt = 0;
    let mut backoff_ms = config.initial_delay_ms;

    loop {
        let err = match f().await {
            Ok(result) => return Ok(result),
            Err(err) => err,
        };

        attempt += 1;
        if !err.is_retryable() {
            return Err(err);
        }
        if attempt > config.max_retries {
            warn!(
                "{} gave up after {} attempts: {}",
                operation_name, attempt, err
            );
            return Err(err);
        }

        let wait_ms = config.wait_for(&err, backoff_ms);
        debug!(
            "{} attempt {}/{} failed ({}), next try in {}ms",
            operation_name, attempt, config.max_retries, err, wait_ms
        );

        sleep(Duration::from_millis(wait_ms)).await;
        backoff_ms = config.next_backoff(backoff_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_config() -> RetryConfig {
        RetryConfig {
            max_retries: 3,
            initial_delay_ms: 5,
            max_delay_ms: 20,
            backoff_factor: 2.0,
            rate_limit_floor_ms: 10,
        }
    }

    #[tokio::test]
    async fn test_success_needs_no_retry() {
        let result = with_retry(&RetryConfig::default(), "klines", || async {
            Ok::<_, SourceError>(vec![1, 2, 3])
        })
        .await;
        assert_eq!(result.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_network_flake_recovers() {
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result = with_retry(&fast_config(), "pair", || {
            let n = attempts_clone.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(SourceError::NetworkError("connection reset".to_string()))
                } else {
                    Ok("0.0123")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "0.0123");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_auth_failure_surfaces_on_first_attempt() {
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result = with_retry(&fast_config(), "games", || {
            attempts_clone.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<(), _>(SourceError::AuthenticationFailed("key rejected".to_string()))
            }
        })
        .await;

        assert!(matches!(result, Err(SourceError::AuthenticationFailed(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_response_is_not_retried() {
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result = with_retry(&fast_config(), "results", || {
            attempts_clone.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(SourceError::MalformedResponse("no rows".to_string())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_persistent_rate_limit_exhausts_budget() {
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();
        let config = fast_config();

        let result = with_retry(&config, "klines", || {
            attempts_clone.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(SourceError::RateLimited) }
        })
        .await;

        assert!(matches!(result, Err(SourceError::RateLimited)));
        // First attempt plus max_retries
        assert_eq!(attempts.load(Ordering::SeqCst), config.max_retries + 1);
    }

    #[test]
    fn test_rate_limit_floor_overrides_small_backoff() {
        let config = RetryConfig::default();
        let rate_limited = config.wait_for(&SourceError::RateLimited, 100);
        assert_eq!(rate_limited, config.rate_limit_floor_ms);

        let network = config.wait_for(&SourceError::NetworkError("dns".to_string()), 100);
        assert_eq!(network, 100);
    }

    #[test]
    fn test_backoff_doubles_up_to_ceiling() {
        let config = RetryConfig::default();
        assert_eq!(config.next_backoff(100), 200);
        assert_eq!(config.next_backoff(4000), config.max_delay_ms);
    }
}
