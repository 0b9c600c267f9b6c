//! In-memory test doubles for the uptime tracker.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use dashmap::DashMap;

use super::uptime::{Clock, GatewayProbe, ProbeError};

/// [`Clock`] driven by hand, for tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now_ms
            .fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Canned behavior of [`MockProbe`] for one URL.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Serve these bytes.
    Body(Vec<u8>),
    /// Fail with a network error.
    Fail(String),
    /// Fail with an HTTP status.
    Status(u16),
    /// Never answer.
    Hang,
}

/// In-memory [`GatewayProbe`] for development and testing.
///
/// URLs without a configured response fail with a network error.
#[derive(Debug, Default)]
pub struct MockProbe {
    responses: Mutex<HashMap<String, MockResponse>>,
    calls: DashMap<String, usize>,
    total: AtomicUsize,
}

impl MockProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (or replaces) the response for `url`.
    pub fn respond(&self, url: impl Into<String>, response: MockResponse) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(url.into(), response);
        }
    }

    /// Number of fetches issued for `url`.
    pub fn calls(&self, url: &str) -> usize {
        self.calls.get(url).map(|c| *c).unwrap_or(0)
    }

    /// Number of fetches issued for any URL.
    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl GatewayProbe for MockProbe {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ProbeError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.calls.entry(url.to_string()).or_insert(0) += 1;

        let response = self
            .responses
            .lock()
            .ok()
            .and_then(|responses| responses.get(url).cloned());

        match response {
            Some(MockResponse::Body(body)) => Ok(body),
            Some(MockResponse::Fail(reason)) => Err(ProbeError::Network(reason)),
            Some(MockResponse::Status(status)) => Err(ProbeError::Status(status)),
            Some(MockResponse::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ProbeError::Network("hung".to_string()))
            }
            None => Err(ProbeError::Network(format!("no route to {}", url))),
        }
    }
}
