//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (per-key fixed-window quota)
//!     → [handler] on denial: RATE_LIMIT error, 429 + X-RateLimit-* headers
//! Background:
//!     → rate_limit.rs sweeper drops expired windows
//! ```
//!
//! # Design Decisions
//! - Limiter state is owned by a struct, never a module-level singleton
//! - Time comes from a `Clock` so window behavior is testable
//! - State is process-local; multi-node deployments need a shared store

pub mod clock;
pub mod rate_limit;

pub use clock::{Clock, ManualClock, SystemClock};
pub use rate_limit::{rate_limit_headers, spawn_sweeper, FixedWindowLimiter};
