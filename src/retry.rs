//! Retry logic with exponential backoff
//!
//! Page fetches from the lead directory go through [`with_retry_using`]. Only errors
//! classified as transient by [`IsRetryable`] are retried, and the default
//! [`RetryConfig`] performs no retries at all.
//!
//! # Example
//!
//! ```no_run
//! use lead_outreach::retry::{IsRetryable, with_retry};
//! use lead_outreach::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{:?}", self)
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() -> Result<(), MyError> {
//! let config = RetryConfig { max_attempts: 3, ..Default::default() };
//! with_retry(&config, || async { Ok::<_, MyError>(()) }).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::DirectoryError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, throttling, upstream 5xx) return `true`.
/// Permanent failures (rejected credentials, undecodable bodies) return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for DirectoryError {
    fn is_retryable(&self) -> bool {
        match self {
            DirectoryError::Transport(_) => true,
            DirectoryError::RateLimited => true,
            DirectoryError::Upstream { status, .. } => *status >= 500,
            // Session problems need an operator, not another attempt
            DirectoryError::Unauthorized | DirectoryError::Forbidden => false,
            DirectoryError::Decode(_) => false,
            DirectoryError::Unsupported => false,
        }
    }
}

/// Execute an async operation with exponential backoff retry logic
///
/// Backoff waits use `tokio::time::sleep`. Use [`with_retry_using`] to wait
/// through something else.
///
/// # Arguments
///
/// * `config` - Retry configuration (max attempts, delays, backoff multiplier, jitter)
/// * `operation` - Async closure that returns Result<T, E> where E implements IsRetryable
///
/// # Returns
///
/// Returns the successful result or the last error after all retry attempts are exhausted.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    with_retry_using(
        config,
        |delay| async move {
            tokio::time::sleep(delay).await;
            true
        },
        operation,
    )
    .await
}

/// Same as [`with_retry`], waiting out each backoff through `wait`
///
/// `wait` returns false when the wait was interrupted; the last error is then
/// returned without another attempt.
pub async fn with_retry_using<W, WFut, F, Fut, T, E>(
    config: &RetryConfig,
    mut wait: W,
    mut operation: F,
) -> Result<T, E>
where
    W: FnMut(Duration) -> WFut,
    WFut: Future<Output = bool>,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                attempt += 1;

                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis(),
                    "Operation failed, retrying"
                );

                let jittered_delay = if config.jitter {
                    add_jitter(delay)
                } else {
                    delay
                };

                if !wait(jittered_delay).await {
                    tracing::debug!(error = %e, attempt = attempt, "Retry wait interrupted");
                    return Err(e);
                }

                let next_delay =
                    Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier);
                delay = next_delay.min(config.max_delay);
            }
            Err(e) => {
                if e.is_retryable() && config.max_attempts > 0 {
                    tracing::error!(
                        error = %e,
                        attempts = attempt + 1,
                        "Operation failed after all retry attempts exhausted"
                    );
                } else {
                    tracing::debug!(error = %e, "Operation failed without retry");
                }
                return Err(e);
            }
        }
    }
}

/// Add random jitter to a delay
///
/// The result lies between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}
