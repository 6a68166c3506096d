//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::Instant;
use uuid::Uuid;

use community_pulse::config::AppConfig;
use community_pulse::contact::{
    CallbackNotifier, ContactForm, ContactRecord, ContactStatus, ContactStore, MemoryContactStore,
};
use community_pulse::http::{build_router, AppState};
use community_pulse::security::FixedWindowLimiter;
use community_pulse::ClassifiedError;

/// Start a programmable mock backend on an ephemeral port.
///
/// Every connection gets the `(status, body)` that `f` produces from the raw
/// request it received.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;

                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read one HTTP/1.1 request (headers plus Content-Length body).
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];

    loop {
        let n = match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        data.extend_from_slice(&buf[..n]);

        let Some(header_end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&data[..header_end]).to_ascii_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);

        if data.len() >= header_end + 4 + content_length {
            break;
        }
    }

    String::from_utf8_lossy(&data).into_owned()
}

/// A captured HTTP request, split into lowercased headers and body.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn parse(raw: &str) -> Self {
        let (head, body) = raw.split_once("\r\n\r\n").unwrap_or((raw, ""));
        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap_or_default().to_string();
        let headers = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
            .collect();

        Self {
            request_line,
            headers,
            body: body.to_string(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Backend answering `status` and keeping every request it received.
pub async fn start_recording_backend(status: u16) -> (SocketAddr, Arc<Mutex<Vec<RecordedRequest>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();

    let addr = start_programmable_backend(move |raw| {
        recorded.lock().unwrap().push(RecordedRequest::parse(&raw));
        async move { (status, "{}".to_string()) }
    })
    .await;

    (addr, requests)
}

/// Listener that accepts and immediately drops every connection.
pub async fn start_dropping_backend() -> (SocketAddr, Arc<AtomicU32>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicU32::new(0));
    let counter = accepted.clone();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(socket);
        }
    });

    (addr, accepted)
}

/// `MakeWriter` collecting formatted log output in memory.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Backend answering `statuses[n]` to the n-th call, then the last entry forever.
pub async fn start_scripted_backend(statuses: Vec<u16>) -> (SocketAddr, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let statuses = Arc::new(statuses);

    let addr = start_programmable_backend(move |_request| {
        let counter = counter.clone();
        let statuses = statuses.clone();
        async move {
            let n = counter.fetch_add(1, Ordering::SeqCst) as usize;
            let status = statuses[n.min(statuses.len() - 1)];
            (status, "{}".to_string())
        }
    })
    .await;

    (addr, calls)
}

/// Store whose first `failures` inserts fail with a DATABASE-kind error.
pub struct FlakyStore {
    inner: MemoryContactStore,
    failures: u32,
    attempts: Mutex<Vec<Instant>>,
}

impl FlakyStore {
    pub fn new(failures: u32) -> Self {
        Self {
            inner: MemoryContactStore::new(),
            failures,
            attempts: Mutex::new(Vec::new()),
        }
    }

    pub fn attempts(&self) -> Vec<Instant> {
        self.attempts.lock().unwrap().clone()
    }

    /// Gaps between consecutive insert attempts.
    pub fn delays(&self) -> Vec<Duration> {
        self.attempts().windows(2).map(|w| w[1] - w[0]).collect()
    }

    pub fn get(&self, id: Uuid) -> Option<ContactRecord> {
        self.inner.get(id)
    }
}

#[async_trait]
impl ContactStore for FlakyStore {
    async fn insert(&self, form: &ContactForm) -> Result<ContactRecord, ClassifiedError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(Instant::now());
            attempts.len() as u32
        };

        if attempt <= self.failures {
            return Err(ClassifiedError::database(
                "DATABASE_INSERT_FAILED",
                "Failed to save contact message",
            )
            .with_details(json!({ "attempt": attempt })));
        }

        self.inner.insert(form).await
    }

    async fn update_status(&self, id: Uuid, status: ContactStatus) -> Result<(), ClassifiedError> {
        self.inner.update_status(id, status).await
    }
}

/// Router plus handles to the pieces tests inspect.
pub struct TestApp {
    pub router: Router,
    pub limiter: Arc<FixedWindowLimiter>,
}

pub fn test_app(
    config: &AppConfig,
    store: Arc<dyn ContactStore>,
    notifier: Option<Arc<dyn CallbackNotifier>>,
) -> TestApp {
    let limiter = Arc::new(FixedWindowLimiter::from_config(&config.rate_limit));
    let state = AppState::new(config, store, notifier, limiter.clone());
    TestApp {
        router: build_router(config, state),
        limiter,
    }
}

pub fn contact_body() -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.org",
        "subject": "Pothole on Main St",
        "message": "There is a large pothole near the library."
    })
}

pub fn contact_request(client: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header("content-type", "application/json")
        .header("x-forwarded-for", client)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
