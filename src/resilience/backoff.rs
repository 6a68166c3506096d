//! Exponential backoff.

use std::time::Duration;

/// Delay before the retry that follows attempt `attempt_index` (0-based).
///
/// `initial_delay_ms * multiplier^attempt_index`, rounded to whole
/// milliseconds and saturating at `u64::MAX` milliseconds. No jitter.
pub fn calculate_backoff(attempt_index: u32, initial_delay_ms: u64, multiplier: f64) -> Duration {
    let exponent = attempt_index.min(i32::MAX as u32) as i32;
    let delay_ms = (initial_delay_ms as f64) * multiplier.powi(exponent);

    // `as` saturates on overflow and maps NaN to 0.
    Duration::from_millis(delay_ms.round() as u64)
}
