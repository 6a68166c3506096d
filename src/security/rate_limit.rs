//! Fixed-window rate limiting.
//!
//! Each key owns a counter and the instant its window resets. The first
//! request after a window has elapsed starts a fresh window at count 1;
//! quotas do not slide.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::RateLimitConfig;
use crate::security::clock::{Clock, SystemClock};

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

#[derive(Debug, Clone, Copy)]
struct RateLimitRecord {
    count: u32,
    window_reset_at: SystemTime,
}

impl RateLimitRecord {
    fn is_expired(&self, now: SystemTime) -> bool {
        now > self.window_reset_at
    }
}

/// Per-key fixed-window request counter.
pub struct FixedWindowLimiter {
    records: Mutex<HashMap<String, RateLimitRecord>>,
    limit: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl FixedWindowLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self::with_clock(limit, window, Arc::new(SystemClock))
    }

    pub fn with_clock(limit: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            limit,
            window,
            clock,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.limit, Duration::from_millis(config.window_ms))
    }

    /// Count a request against `key`. Returns `false` when the quota for
    /// the current window is used up; a denied request is not counted.
    pub fn check(&self, key: &str) -> bool {
        let now = self.clock.now();
        let mut records = self.records.lock().expect("rate limiter mutex poisoned");

        if let Some(record) = records.get_mut(key) {
            if !record.is_expired(now) {
                if record.count >= self.limit {
                    return false;
                }
                record.count += 1;
                return true;
            }
        }

        records.insert(
            key.to_string(),
            RateLimitRecord {
                count: 1,
                window_reset_at: now + self.window,
            },
        );
        true
    }

    /// Requests still allowed for `key` in its current window.
    pub fn remaining(&self, key: &str) -> u32 {
        let now = self.clock.now();
        let records = self.records.lock().expect("rate limiter mutex poisoned");

        match records.get(key) {
            Some(record) if !record.is_expired(now) => self.limit.saturating_sub(record.count),
            _ => self.limit,
        }
    }

    /// When the window for `key` resets, if a record exists.
    pub fn reset_at(&self, key: &str) -> Option<SystemTime> {
        let records = self.records.lock().expect("rate limiter mutex poisoned");
        records.get(key).map(|record| record.window_reset_at)
    }

    /// Drop every record whose window has elapsed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut records = self.records.lock().expect("rate limiter mutex poisoned");
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        before - records.len()
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.records.lock().expect("rate limiter mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FixedWindowLimiter {
    fn default() -> Self {
        Self::new(100, Duration::from_millis(60_000))
    }
}

/// `X-RateLimit-*` headers describing `key`'s current window.
///
/// The reset header carries Unix epoch milliseconds and is omitted when the
/// key has no record.
pub fn rate_limit_headers(limiter: &FixedWindowLimiter, key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limiter.limit()));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(limiter.remaining(key)));

    if let Some(reset_at) = limiter.reset_at(key) {
        let millis = reset_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        headers.insert(X_RATELIMIT_RESET, HeaderValue::from(millis));
    }

    headers
}

/// Periodically purge expired windows until shutdown is signalled.
pub fn spawn_sweeper(
    limiter: Arc<FixedWindowLimiter>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let purged = limiter.purge_expired();
                    if purged > 0 {
                        tracing::debug!(purged, remaining_keys = limiter.len(), "Purged expired rate limit windows");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Rate limit sweeper stopping");
                    break;
                }
            }
        }
    })
}
