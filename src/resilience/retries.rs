//! Retry logic.
//!
//! # Responsibilities
//! - Run an async operation up to `retries + 1` times
//! - Ask the caller whether a given failure may be retried
//! - Sleep with exponential backoff between attempts
//!
//! # Design Decisions
//! - The predicate sees the raw error (e.g. retry only DATABASE kinds)
//! - Backoff sleeps on the Tokio timer; other requests keep running
//! - The final error is returned as-is, never wrapped

use std::fmt;
use std::future::Future;

use crate::config::RetryOptions;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;

/// Predicate that treats every failure as retryable.
pub fn always<E>(_: &E) -> bool {
    true
}

/// Run `operation`, retrying eligible failures with exponential backoff.
///
/// The delay before retry `k` (1-based) is
/// `initial_delay_ms * backoff_multiplier^(k - 1)`.
pub async fn with_retry<T, E, F, Fut, P>(
    options: &RetryOptions,
    should_retry: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: fmt::Display,
{
    let mut attempt: u32 = 0;

    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if attempt >= options.retries {
            tracing::debug!(attempts = attempt + 1, error = %error, "Retries exhausted");
            return Err(error);
        }
        if !should_retry(&error) {
            tracing::debug!(attempts = attempt + 1, error = %error, "Failure not retryable");
            return Err(error);
        }

        let delay = calculate_backoff(attempt, options.initial_delay_ms, options.backoff_multiplier);
        attempt += 1;

        tracing::info!(attempt = attempt, delay = ?delay, error = %error, "Retrying operation");
        metrics::record_retry();

        tokio::time::sleep(delay).await;
    }
}
