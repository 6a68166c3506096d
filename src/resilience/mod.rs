//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Fallible async operation (store insert, webhook call):
//!     → retries.rs (run, ask caller predicate if the failure is retryable)
//!     → backoff.rs (delay before the next attempt)
//!     → tokio timer (non-blocking sleep), then next attempt
//! ```
//!
//! # Design Decisions
//! - Retry eligibility is decided by the caller, per error
//! - Attempts are strictly sequential; no speculative retries
//! - No timeout at this layer; operations enforce their own deadlines
//! - The last error is surfaced unchanged once retries stop

pub mod backoff;
pub mod retries;

pub use backoff::calculate_backoff;
pub use retries::{always, with_retry};
