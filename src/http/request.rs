//! Request inspection.
//!
//! # Responsibilities
//! - Identify the client for rate limiting
//!
//! # Design Decisions
//! - First `X-Forwarded-For` entry wins; the service runs behind a proxy
//! - Falls back to the peer address, then to "unknown"

use std::net::SocketAddr;

use axum::{extract::ConnectInfo, http::Request};

pub const X_REQUEST_ID: &str = "x-request-id";
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Best-effort client address for a request.
pub fn client_address<B>(request: &Request<B>) -> String {
    let forwarded = request
        .headers()
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(addr) = forwarded {
        return addr.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Request ID assigned by the request-id layer, if any.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}
