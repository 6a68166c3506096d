//! Callback webhook delivery against a mock HTTP backend.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::Value;
use tower::ServiceExt;

use community_pulse::config::{AppConfig, Environment, RetryOptions};
use community_pulse::contact::{
    CallbackNotifier, ContactStatus, HttpCallbackNotifier, MemoryContactStore,
};

mod common;

fn callback_body() -> Value {
    let mut body = common::contact_body();
    body["phoneNumber"] = "+1 555 0100".into();
    body["callbackRequested"] = true.into();
    body
}

fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.environment = Environment::Test;
    config.retries.webhook = RetryOptions {
        retries: 2,
        initial_delay_ms: 10,
        backoff_multiplier: 2.0,
    };
    config
}

fn notifier_for(addr: std::net::SocketAddr) -> Arc<dyn CallbackNotifier> {
    Arc::new(
        HttpCallbackNotifier::new(
            format!("http://{}/webhook", addr),
            "test-key",
            Duration::from_secs(2),
        )
        .unwrap(),
    )
}

async fn submit(config: &AppConfig, notifier: Arc<dyn CallbackNotifier>) -> (StatusCode, Value, Arc<MemoryContactStore>) {
    let store = Arc::new(MemoryContactStore::new());
    let app = common::test_app(config, store.clone(), Some(notifier));

    let res = app
        .router
        .oneshot(common::contact_request("203.0.113.99", &callback_body()))
        .await
        .unwrap();
    let status = res.status();
    (status, common::json_body(res).await, store)
}

#[tokio::test]
async fn test_webhook_recovers_after_server_errors() {
    let (addr, calls) = common::start_scripted_backend(vec![503, 502, 200]).await;
    let (status, body, store) = submit(&config(), notifier_for(addr)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let id = body["id"].as_str().unwrap().parse().unwrap();
    assert_eq!(store.get(id).unwrap().status, ContactStatus::New);
}

#[tokio::test]
async fn test_webhook_client_error_not_retried() {
    let (addr, calls) = common::start_scripted_backend(vec![400]).await;
    let (status, body, store) = submit(&config(), notifier_for(addr)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let id = body["id"].as_str().unwrap().parse().unwrap();
    assert_eq!(store.get(id).unwrap().status, ContactStatus::WebhookFailed);
}

#[tokio::test]
async fn test_webhook_exhaustion_marks_record() {
    let (addr, calls) = common::start_scripted_backend(vec![500]).await;
    let (status, body, store) = submit(&config(), notifier_for(addr)).await;

    // Submission still succeeds.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let id = body["id"].as_str().unwrap().parse().unwrap();
    let record = store.get(id).unwrap();
    assert_eq!(record.status, ContactStatus::WebhookFailed);
    assert!(record.updated_at.is_some());
}

#[tokio::test]
async fn test_webhook_request_headers_and_payload() {
    let (addr, requests) = common::start_recording_backend(200).await;
    let (status, body, _store) = submit(&config(), notifier_for(addr)).await;
    assert_eq!(status, StatusCode::OK);

    let requests = requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    assert_eq!(request.request_line, "POST /webhook HTTP/1.1");
    assert_eq!(request.header("x-api-key"), Some("test-key"));
    assert_eq!(request.header("user-agent"), Some("CommunityPulse/1.0"));
    assert_eq!(request.header("content-type"), Some("application/json"));

    let payload = request.json();
    assert_eq!(payload["contactId"], body["id"]);
    assert_eq!(payload["firstName"], "Ada");
    assert_eq!(payload["lastName"], "Lovelace");
    assert_eq!(payload["email"], "ada@example.org");
    assert_eq!(payload["phoneNumber"], "+1 555 0100");
    assert_eq!(payload["subject"], "Pothole on Main St");
    assert_eq!(payload["message"], "There is a large pothole near the library.");
    assert_eq!(payload["source"], "contact_form");
    assert_eq!(payload["environment"], "test");
    assert!(payload["timestamp"].is_string());
}

#[tokio::test]
async fn test_no_webhook_without_callback_request() {
    let (addr, requests) = common::start_recording_backend(200).await;
    let store = Arc::new(MemoryContactStore::new());
    let app = common::test_app(&config(), store, Some(notifier_for(addr)));

    let mut body = callback_body();
    body["callbackRequested"] = false.into();
    let res = app
        .router
        .oneshot(common::contact_request("203.0.113.98", &body))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_dropped_connections_are_retried() {
    let (addr, accepted) = common::start_dropping_backend().await;
    let (status, body, store) = submit(&config(), notifier_for(addr)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted.load(Ordering::SeqCst), 3);

    let id = body["id"].as_str().unwrap().parse().unwrap();
    assert_eq!(store.get(id).unwrap().status, ContactStatus::WebhookFailed);
}

#[tokio::test]
async fn test_unreachable_webhook_flags_record() {
    // Bind and drop to get a port with nothing listening.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let (status, body, store) = submit(&config(), notifier_for(addr)).await;
    assert_eq!(status, StatusCode::OK);

    let id = body["id"].as_str().unwrap().parse().unwrap();
    assert_eq!(store.get(id).unwrap().status, ContactStatus::WebhookFailed);
}
