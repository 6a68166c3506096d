//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pulse_requests_total` (counter): requests by route, method, status
//! - `pulse_request_duration_seconds` (histogram): latency distribution
//! - `pulse_rate_limited_total` (counter): requests denied by the limiter
//! - `pulse_retries_total` (counter): retry attempts scheduled
//! - `pulse_errors_total` (counter): errors turned into responses, by kind

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::errors::ErrorKind;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &'static str, method: &str, status: u16, start: Instant) {
    let labels = [
        ("route", route.to_string()),
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("pulse_requests_total", &labels).increment(1);
    metrics::histogram!("pulse_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited(endpoint: &'static str) {
    metrics::counter!("pulse_rate_limited_total", "endpoint" => endpoint).increment(1);
}

pub fn record_retry() {
    metrics::counter!("pulse_retries_total").increment(1);
}

pub fn record_error(kind: ErrorKind) {
    metrics::counter!("pulse_errors_total", "kind" => kind.as_str()).increment(1);
}
