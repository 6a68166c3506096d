//! Response boundary for failed requests.
//!
//! # Responsibilities
//! - Classify anything that reaches the boundary unclassified
//! - Log the failure exactly once, with its cause and backtrace
//! - Map kind → status and build the client-visible JSON body
//!
//! # Design Decisions
//! - Client errors (4xx) log at WARN, server errors (5xx) at ERROR
//! - `details` are dropped from the body in production

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::config::Environment;
use crate::errors::classified::{BoxError, ClassifiedError};
use crate::errors::kind::ErrorKind;
use crate::observability::metrics;

const UNEXPECTED_CODE: &str = "UNEXPECTED_ERROR";
const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred";

/// JSON body sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Status plus body, ready to be turned into an HTTP response.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Convert any error into a logged, client-safe response.
pub fn to_response<E>(error: E, environment: Environment) -> ErrorResponse
where
    E: Into<BoxError>,
{
    let classified = match error.into().downcast::<ClassifiedError>() {
        Ok(classified) => *classified,
        Err(other) => {
            let message = match other.to_string() {
                m if m.is_empty() => UNEXPECTED_MESSAGE.to_string(),
                m => m,
            };
            ClassifiedError::internal(UNEXPECTED_CODE, message).with_cause(other)
        }
    };

    log_error(&classified);
    metrics::record_error(classified.kind());

    let details = if environment.is_production() {
        None
    } else {
        classified.details().cloned()
    };

    ErrorResponse {
        status: classified.kind().status(),
        body: ErrorBody {
            kind: classified.kind(),
            code: classified.code().to_string(),
            message: classified.message().to_string(),
            details,
        },
    }
}

fn log_error(error: &ClassifiedError) {
    let timestamp = chrono::Utc::now().to_rfc3339();
    let details = error.details().map(|d| d.to_string());
    let cause = error.cause().map(|c| c.to_string());

    if error.kind().status().is_server_error() {
        tracing::error!(
            timestamp = %timestamp,
            kind = %error.kind(),
            code = error.code(),
            error_message = error.message(),
            stack = %error.backtrace(),
            details = ?details,
            cause = ?cause,
            "Request failed"
        );
    } else {
        tracing::warn!(
            timestamp = %timestamp,
            kind = %error.kind(),
            code = error.code(),
            error_message = error.message(),
            stack = %error.backtrace(),
            details = ?details,
            cause = ?cause,
            "Request rejected"
        );
    }
}
