use crate::error::DroveError;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        // One try plus five retries for connect and read failures
        Self {
            max_attempts: 6,
            initial_delay_ms: 100,
            max_delay_ms: 2000,
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// A single attempt, no retries.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

/// Configuration for timeout behavior
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    pub connect_timeout_ms: u64,
    /// Longest wait for any single read, response headers included.
    pub read_timeout_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000, // 10 seconds
            read_timeout_ms: 30_000, // 30 seconds
        }
    }
}

/// Determines if a transport error is worth another attempt.
///
/// Only connection and read level failures qualify. Responses are never
/// turned into errors before this point, so HTTP statuses are not retried.
#[must_use]
pub fn is_retryable_error(error: &reqwest::Error) -> bool {
    if error.is_builder() {
        return false;
    }
    error.is_connect() || error.is_timeout() || error.is_request()
}

/// Calculates the delay for a given retry attempt with exponential backoff
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]
pub fn calculate_retry_delay(config: &RetryConfig, attempt: usize) -> Duration {
    let base_delay = config.initial_delay_ms as f64;
    let attempt_i32 = attempt.min(30) as i32; // Cap attempt to prevent overflow
    let delay_ms =
        (base_delay * config.backoff_multiplier.powi(attempt_i32)).min(config.max_delay_ms as f64);

    let final_delay_ms = if config.jitter {
        // Up to 25% jitter
        let jitter_factor = fastrand::f64().mul_add(0.25, 1.0);
        delay_ms * jitter_factor
    } else {
        delay_ms
    } as u64;

    Duration::from_millis(final_delay_ms)
}

/// Executes a request future with retry logic based on the configuration.
///
/// # Errors
/// Returns a transport `DroveError` once all attempts fail or a
/// non-retryable transport error occurs.
pub async fn execute_with_retry<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, DroveError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, reqwest::Error>>,
{
    let start_time = Instant::now();
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        let error = match operation().await {
            Ok(result) => return Ok(result),
            Err(error) => error,
        };

        attempt += 1;
        if attempt >= max_attempts || !is_retryable_error(&error) {
            warn!(
                target: "drove::client",
                operation = operation_name,
                attempts = attempt,
                elapsed_ms = start_time.elapsed().as_millis(),
                "giving up: {error}"
            );
            return Err(DroveError::transport(error.to_string()));
        }

        let delay = calculate_retry_delay(config, attempt - 1);
        debug!(
            target: "drove::client",
            operation = operation_name,
            attempt,
            delay_ms = delay.as_millis(),
            "retrying after transport error: {error}"
        );
        sleep(delay).await;
    }
}

/// Creates an HTTP client builder with connect and per-read timeouts.
///
/// There is no overall deadline, so a download that keeps delivering data
/// runs as long as it needs.
#[must_use]
pub fn resilient_client_builder(timeout_config: &TimeoutConfig) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_millis(timeout_config.connect_timeout_ms))
        .read_timeout(Duration::from_millis(timeout_config.read_timeout_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_retry_delay() {
        let config = RetryConfig {
            max_attempts: 5,
            initial_delay_ms: 100,
            max_delay_ms: 1000,
            backoff_multiplier: 2.0,
            jitter: false,
        };

        let delay1 = calculate_retry_delay(&config, 0);
        let delay2 = calculate_retry_delay(&config, 1);
        let delay3 = calculate_retry_delay(&config, 2);

        assert_eq!(delay1.as_millis(), 100);
        assert_eq!(delay2.as_millis(), 200);
        assert_eq!(delay3.as_millis(), 400);

        // Test max delay cap
        let delay_max = calculate_retry_delay(&config, 10);
        assert_eq!(delay_max.as_millis(), 1000);
    }

    #[test]
    fn test_calculate_retry_delay_with_jitter() {
        let config = RetryConfig {
            max_attempts: 3,
            initial_delay_ms: 100,
            max_delay_ms: 1000,
            backoff_multiplier: 2.0,
            jitter: true,
        };

        let delay1 = calculate_retry_delay(&config, 0);
        let delay2 = calculate_retry_delay(&config, 0);

        assert!(delay1.as_millis() >= 100 && delay1.as_millis() <= 125);
        assert!(delay2.as_millis() >= 100 && delay2.as_millis() <= 125);
    }

    #[test]
    fn test_default_configs() {
        let retry_config = RetryConfig::default();
        assert_eq!(retry_config.max_attempts, 6);
        assert_eq!(retry_config.initial_delay_ms, 100);

        let timeout_config = TimeoutConfig::default();
        assert_eq!(timeout_config.connect_timeout_ms, 10_000);
        assert_eq!(timeout_config.read_timeout_ms, 30_000);
    }

    #[test]
    fn test_disabled_retry_is_single_attempt() {
        assert_eq!(RetryConfig::disabled().max_attempts, 1);
    }

    #[tokio::test]
    async fn test_execute_with_retry_returns_first_success() {
        let config = RetryConfig::default();
        let result: Result<u32, DroveError> =
            execute_with_retry(&config, "noop", || async { Ok::<u32, reqwest::Error>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
