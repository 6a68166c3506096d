//! Community Pulse contact service library.

pub mod config;
pub mod contact;
pub mod errors;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;

pub use config::AppConfig;
pub use errors::{classify, status_for, to_response, ClassifiedError, ErrorKind};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resilience::with_retry;
pub use security::FixedWindowLimiter;
