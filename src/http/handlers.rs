//! Route handlers.

use std::time::Instant;

use axum::{
    body::{self, Body},
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::contact::{ContactForm, ContactRecord};
use crate::errors::{self, ClassifiedError, ErrorKind};
use crate::http::request::{client_address, request_id};
use crate::http::response::with_rate_limit_headers;
use crate::http::server::AppState;
use crate::observability::metrics;

const CONTACT_ROUTE: &str = "contact";

/// Success body for `POST /api/contact`.
#[derive(Debug, Serialize)]
pub struct ContactAccepted {
    pub success: bool,
    pub message: &'static str,
    pub id: Uuid,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// `POST /api/contact`.
pub async fn submit_contact(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let key = format!("{}_{}", CONTACT_ROUTE, client_address(&request));
    let request_id = request_id(&request);

    let response = match accept_contact(&state, &key, request).await {
        Ok(record) => {
            tracing::info!(request_id = %request_id, contact_id = %record.id, "Contact message accepted");
            Json(ContactAccepted {
                success: true,
                message: "Contact message sent successfully",
                id: record.id,
                timestamp: chrono::Utc::now().to_rfc3339(),
            })
            .into_response()
        }
        Err(error) => {
            if error.kind() == ErrorKind::RateLimit {
                metrics::record_rate_limited(CONTACT_ROUTE);
            }
            errors::to_response(error, state.environment).into_response()
        }
    };

    metrics::record_request(CONTACT_ROUTE, "POST", response.status().as_u16(), start);
    with_rate_limit_headers(response, &state.limiter, &key)
}

async fn accept_contact(
    state: &AppState,
    key: &str,
    request: Request<Body>,
) -> Result<ContactRecord, ClassifiedError> {
    if !state.limiter.check(key) {
        return Err(ClassifiedError::rate_limited(
            "RATE_LIMIT_EXCEEDED",
            "Too many requests, please try again later",
        ));
    }

    let bytes = body::to_bytes(request.into_body(), state.max_body_size)
        .await
        .map_err(|e| {
            ClassifiedError::validation("INVALID_BODY", "Request body could not be read")
                .with_cause(e)
        })?;

    let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
        ClassifiedError::validation("INVALID_JSON", "Invalid JSON in request body").with_cause(e)
    })?;
    let form = ContactForm::from_value(value)?;

    state.contacts.submit(&form).await
}

/// `GET /health`.
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Fallback for unknown routes.
pub async fn not_found(State(state): State<AppState>, request: Request<Body>) -> Response {
    let error = ClassifiedError::new(
        ErrorKind::NotFound,
        "ROUTE_NOT_FOUND",
        format!("No route for {} {}", request.method(), request.uri().path()),
    );
    errors::to_response(error, state.environment).into_response()
}
