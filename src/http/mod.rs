//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, body limit, tracing)
//!     → request.rs (client address for rate limit keys)
//!     → handlers.rs (rate limit → parse → contact service)
//!     → response.rs (X-RateLimit-* headers) / errors::to_response on failure
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{client_address, X_REQUEST_ID};
pub use server::{build_router, AppState, HttpServer};
