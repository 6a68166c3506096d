//! Response decoration.
//!
//! # Responsibilities
//! - Attach `X-RateLimit-*` headers describing the caller's window
//!
//! # Design Decisions
//! - Headers are added to every contact response, including rejections

use axum::response::Response;

use crate::security::{rate_limit_headers, FixedWindowLimiter};

/// Add the limiter's headers for `key` to `response`.
pub fn with_rate_limit_headers(
    mut response: Response,
    limiter: &FixedWindowLimiter,
    key: &str,
) -> Response {
    response.headers_mut().extend(rate_limit_headers(limiter, key));
    response
}
