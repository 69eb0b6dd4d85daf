//! Retry logic for the listing endpoint
//!
//! This module provides the fixed-interval retry loop used by
//! [`ListingClient`](crate::listing::ListingClient). Unlike a backoff
//! schedule tuned for long-lived downloads, the listing fetch uses a flat
//! delay between attempts and a hard attempt ceiling: listing-endpoint
//! unavailability is fatal for the whole run, so there is no point in
//! waiting minutes for it to come back.
//!
//! # Example
//!
//! ```no_run
//! use listing_dl::retry::{IsRetryable, fetch_with_retry};
//! use listing_dl::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{self:?}")
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
//! let config = RetryConfig::default();
//! let result = fetch_with_retry(&config, || async {
//!     // Your operation here
//!     Ok::<_, MyError>(())
//! }).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::{Error, ListingError};
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (non-success listing status, network timeout,
/// connection refused) should return `true`. Permanent failures (malformed
/// body, configuration errors) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

/// Implementation of IsRetryable for our Error type
impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // Any non-success status from the listing endpoint is retried
            // up to the attempt ceiling
            Error::Listing(ListingError::BadStatus { .. }) => true,
            // Exhaustion is the terminal form of BadStatus
            Error::Listing(ListingError::RetriesExhausted { .. }) => false,
            // A malformed body will not improve on retry
            Error::Listing(ListingError::InvalidBody { .. }) => false,
            // Timeouts and connection errors are transient
            Error::Network(e) => e.is_timeout() || e.is_connect(),
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
            ),
            // Photo downloads never retry in-run; they go through the journal
            Error::Download(_) => false,
            // Journal and config problems are permanent
            Error::Journal(_) => false,
            Error::Config { .. } => false,
            Error::Serialization(_) => false,
        }
    }
}

/// Execute an async operation with fixed-interval retry logic
///
/// # Arguments
///
/// * `config` - Retry configuration (attempt ceiling, backoff, jitter)
/// * `operation` - Async closure returning `Result<T, E>` where `E`
///   implements [`IsRetryable`]
///
/// # Returns
///
/// The successful result, or the last error once `config.max_attempts`
/// attempts (including the first) have been made. The backoff sleep is a
/// suspension point, never a thread-blocking wait.
pub async fn fetch_with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut attempt: u32 = 1;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = config.backoff.as_millis(),
                    "Operation failed, retrying"
                );

                let delay = if config.jitter {
                    add_jitter(config.backoff)
                } else {
                    config.backoff
                };
                tokio::time::sleep(delay).await;

                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(
                        error = %e,
                        attempts = attempt,
                        "Operation failed after all retry attempts exhausted"
                    );
                } else {
                    tracing::error!(
                        error = %e,
                        "Operation failed with non-retryable error"
                    );
                }
                return Err(e);
            }
        }
    }
}

/// Add random jitter to a delay to prevent thundering herd
///
/// Jitter is uniformly distributed between 0% and 100% of the delay, so the
/// actual delay falls between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}
