//! Error classification subsystem.
//!
//! # Data Flow
//! ```text
//! Failure detected (store, webhook, limiter, form validation)
//!     → classified.rs (ClassifiedError with a fixed ErrorKind)
//!     → [optional] resilience::retries decides eligibility from the kind
//!     → response.rs (log once, map kind → status, client-safe JSON body)
//! ```
//!
//! # Design Decisions
//! - Errors are classified as close to their origin as possible
//! - Classified errors are never re-wrapped; only unclassified ones are
//! - Stack traces are logged, never sent to clients
//! - `details` only leave the process outside production

pub mod classified;
pub mod kind;
pub mod response;

pub use classified::{classify, BoxError, ClassifiedError};
pub use kind::{status_for, ErrorKind};
pub use response::{to_response, ErrorBody, ErrorResponse};
