//! Gateway uptime tracking.
//!
//! Each gateway is either Fresh (a result newer than the TTL exists) or
//! Stale/Absent. Staleness is computed at read time from the stored
//! timestamp; there is no expiry sweep. A stale read triggers one bounded
//! probe, whose result replaces the cache entry unless a newer one landed
//! first.
//!
//! Timeouts, network errors, bad statuses and hash mismatches all collapse to
//! `ok = false`. The distinction only reaches the logs and the optional
//! [`ProbeObserver`].

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use dashmap::{mapref::entry::Entry, DashMap};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::LookupError;
use crate::models::gateway::{GatewayRecord, GatewayTable, UptimeResult};

/// Reasons a probe did not verify a gateway.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Probe timed out after {0}ms")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Gateway responded with HTTP {0}")]
    Status(u16),

    #[error("Response body exceeds {0} bytes")]
    BodyTooLarge(u64),

    #[error("Content does not match the fixture's integrity hash")]
    IntegrityMismatch,
}

impl ProbeError {
    /// Short metric label for this failure.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Network(_) => "network_error",
            Self::Status(_) => "bad_status",
            Self::BodyTooLarge(_) => "body_too_large",
            Self::IntegrityMismatch => "integrity_mismatch",
        }
    }
}

/// Metric label for a finished probe: `ok` or the failure's label.
pub fn outcome_label(outcome: &Result<(), ProbeError>) -> &'static str {
    match outcome {
        Ok(()) => "ok",
        Err(e) => e.label(),
    }
}

/// Content fetch capability supplied by the host (network stack).
#[async_trait::async_trait]
pub trait GatewayProbe: Send + Sync {
    /// Fetches the full body served at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ProbeError>;
}

/// Receives the final verdict of every probe, after the timeout and the
/// integrity check. Cache hits are not reported.
pub trait ProbeObserver: Send + Sync {
    fn observe(&self, gateway_id: &str, outcome: &Result<(), ProbeError>, elapsed: Duration);
}

/// Wall clock in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Tracker tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UptimeSettings {
    /// Hard bound on a single probe.
    pub probe_timeout: Duration,
    /// How long a result stays fresh.
    pub ttl: Duration,
}

impl Default for UptimeSettings {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_millis(1500),
            ttl: Duration::from_secs(600),
        }
    }
}

/// Counts from a full refresh pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub healthy: usize,
    pub unhealthy: usize,
}

struct TrackerInner {
    gateways: ArcSwap<GatewayTable>,
    cache: DashMap<String, UptimeResult>,
    probe: Arc<dyn GatewayProbe>,
    clock: Arc<dyn Clock>,
    observer: Option<Arc<dyn ProbeObserver>>,
    settings: UptimeSettings,
}

/// Time-bounded cache of gateway health. Cheap to clone.
#[derive(Clone)]
pub struct GatewayUptimeTracker {
    inner: Arc<TrackerInner>,
}

impl GatewayUptimeTracker {
    pub fn new(
        gateways: Arc<GatewayTable>,
        probe: Arc<dyn GatewayProbe>,
        clock: Arc<dyn Clock>,
        settings: UptimeSettings,
    ) -> Self {
        Self::build(gateways, probe, clock, None, settings)
    }

    /// Like [`GatewayUptimeTracker::new`], reporting each probe verdict to
    /// `observer`.
    pub fn new_observed(
        gateways: Arc<GatewayTable>,
        probe: Arc<dyn GatewayProbe>,
        clock: Arc<dyn Clock>,
        observer: Arc<dyn ProbeObserver>,
        settings: UptimeSettings,
    ) -> Self {
        Self::build(gateways, probe, clock, Some(observer), settings)
    }

    fn build(
        gateways: Arc<GatewayTable>,
        probe: Arc<dyn GatewayProbe>,
        clock: Arc<dyn Clock>,
        observer: Option<Arc<dyn ProbeObserver>>,
        settings: UptimeSettings,
    ) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                gateways: ArcSwap::new(gateways),
                cache: DashMap::new(),
                probe,
                clock,
                observer,
                settings,
            }),
        }
    }

    pub fn settings(&self) -> UptimeSettings {
        self.inner.settings
    }

    /// Current gateway table.
    pub fn gateways(&self) -> Arc<GatewayTable> {
        self.inner.gateways.load_full()
    }

    /// Swaps in a new gateway table. Cached results survive only for
    /// gateways whose record (URL, continent and fixture) is unchanged.
    pub fn replace_gateways(&self, gateways: Arc<GatewayTable>) {
        let previous = self.inner.gateways.swap(Arc::clone(&gateways));
        let before = self.inner.cache.len();
        self.inner.cache.retain(|id, _| {
            matches!(
                (previous.get(id), gateways.get(id)),
                (Some(old), Some(new)) if old == new
            )
        });
        info!(
            gateways = gateways.len(),
            pruned = before.saturating_sub(self.inner.cache.len()),
            "Gateway table replaced"
        );
    }

    /// The cached result for `gateway_id` if it is still fresh.
    pub fn cached(&self, gateway_id: &str) -> Option<UptimeResult> {
        let now = self.inner.clock.now_ms();
        let ttl_ms = self.ttl_ms();
        self.inner
            .cache
            .get(gateway_id)
            .map(|entry| *entry.value())
            .filter(|result| result.is_fresh(now, ttl_ms))
    }

    /// Health of one gateway, probing only when the cached result is stale.
    pub async fn check_gateway(&self, gateway_id: &str) -> Result<UptimeResult, LookupError> {
        let gateway = self
            .inner
            .gateways
            .load()
            .get(gateway_id)
            .cloned()
            .ok_or_else(|| LookupError::GatewayNotFound(gateway_id.to_string()))?;

        Ok(self.check(&gateway).await)
    }

    /// Healthy gateways of `continent_code`, in table order.
    pub async fn list_healthy_gateways(&self, continent_code: &str) -> Vec<String> {
        let candidates: Vec<GatewayRecord> = self
            .inner
            .gateways
            .load()
            .in_continent(continent_code)
            .cloned()
            .collect();

        self.check_all(candidates)
            .await
            .into_iter()
            .filter(|(_, ok)| *ok)
            .map(|(id, _)| id)
            .collect()
    }

    /// Checks every gateway in the table. Fresh entries are not re-probed.
    pub async fn refresh_all(&self) -> RefreshSummary {
        let gateways: Vec<GatewayRecord> = self.inner.gateways.load().iter().cloned().collect();

        let mut summary = RefreshSummary::default();
        for (_, ok) in self.check_all(gateways).await {
            if ok {
                summary.healthy += 1;
            } else {
                summary.unhealthy += 1;
            }
        }
        summary
    }

    /// Checks gateways concurrently and returns `(id, ok)` in input order.
    async fn check_all(&self, gateways: Vec<GatewayRecord>) -> Vec<(String, bool)> {
        let mut tasks = JoinSet::new();
        for (position, gateway) in gateways.into_iter().enumerate() {
            let tracker = self.clone();
            tasks.spawn(async move {
                let result = tracker.check(&gateway).await;
                (position, gateway.id, result.ok)
            });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => results.push(entry),
                Err(e) => warn!(error = %e, "Gateway check task failed"),
            }
        }

        results.sort_by_key(|(position, _, _)| *position);
        results
            .into_iter()
            .map(|(_, id, ok)| (id, ok))
            .collect()
    }

    async fn check(&self, gateway: &GatewayRecord) -> UptimeResult {
        if let Some(result) = self.cached(&gateway.id) {
            return result;
        }

        let started = Instant::now();
        let outcome = self.probe(gateway).await;
        let elapsed = started.elapsed();
        let finished = self.inner.clock.now_ms();

        match &outcome {
            Ok(()) => debug!(
                gateway_id = %gateway.id,
                elapsed_ms = elapsed.as_millis() as u64,
                "Gateway probe succeeded"
            ),
            Err(e) => warn!(
                gateway_id = %gateway.id,
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "Gateway probe failed"
            ),
        }
        if let Some(observer) = &self.inner.observer {
            observer.observe(&gateway.id, &outcome, elapsed);
        }

        self.store(
            gateway,
            UptimeResult {
                ok: outcome.is_ok(),
                timestamp_ms: finished,
            },
        )
    }

    async fn probe(&self, gateway: &GatewayRecord) -> Result<(), ProbeError> {
        let url = gateway.probe_url();
        let timeout = self.inner.settings.probe_timeout;

        let body = tokio::time::timeout(timeout, self.inner.probe.fetch(&url))
            .await
            .map_err(|_| ProbeError::Timeout(timeout.as_millis() as u64))??;

        if gateway.fixture.integrity.matches(&body) {
            Ok(())
        } else {
            Err(ProbeError::IntegrityMismatch)
        }
    }

    /// Compare-and-set on timestamp: an older result never replaces a newer
    /// one. Returns the entry that is current after the write.
    ///
    /// Results for a record that is no longer in the table are dropped. The
    /// table is read while the entry's shard lock is held, so a concurrent
    /// [`GatewayUptimeTracker::replace_gateways`] either prunes this write
    /// or is seen by it.
    fn store(&self, gateway: &GatewayRecord, result: UptimeResult) -> UptimeResult {
        let entry = self.inner.cache.entry(gateway.id.clone());
        if self.inner.gateways.load().get(&gateway.id) != Some(gateway) {
            return result;
        }

        match entry {
            Entry::Occupied(mut occupied) => {
                if result.timestamp_ms > occupied.get().timestamp_ms {
                    occupied.insert(result);
                }
                *occupied.get()
            }
            Entry::Vacant(vacant) => *vacant.insert(result),
        }
    }

    fn ttl_ms(&self) -> i64 {
        i64::try_from(self.inner.settings.ttl.as_millis()).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::gateway::{RawFixture, RawGateway};
    use crate::services::testing::{ManualClock, MockProbe, MockResponse};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    const CONTENT_ID: &str = "QmbFMke1KXqnYyBBWxB74N4c5SBnJMVAiMNRcGu6x1AwQH";
    const EMPTY_SHA256: &str = "sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=";
    const START_MS: i64 = 1_700_000_000_000;

    fn table(gateways: &[(&str, &str)]) -> Arc<GatewayTable> {
        let urls: Vec<String> = gateways
            .iter()
            .map(|(id, _)| format!("https://{}.example/ipfs/:hash", id))
            .collect();
        let entries: Vec<(&str, &str, &str)> = gateways
            .iter()
            .zip(&urls)
            .map(|((id, continent), url)| (*id, *continent, url.as_str()))
            .collect();
        table_with_urls(&entries)
    }

    fn table_with_urls(gateways: &[(&str, &str, &str)]) -> Arc<GatewayTable> {
        let mut fixtures = BTreeMap::new();
        fixtures.insert(
            "package".to_string(),
            RawFixture {
                integrity_hash: EMPTY_SHA256.to_string(),
                content_id: CONTENT_ID.to_string(),
            },
        );
        let raw = gateways
            .iter()
            .map(|(id, continent, url)| RawGateway {
                id: id.to_string(),
                continent_code: continent.to_string(),
                url: url.to_string(),
                fixture: "package".to_string(),
            })
            .collect();
        Arc::new(GatewayTable::from_raw(fixtures, raw, |_| true).unwrap())
    }

    fn url(id: &str) -> String {
        format!("https://{}.example/ipfs/{}", id, CONTENT_ID)
    }

    struct Harness {
        tracker: GatewayUptimeTracker,
        probe: Arc<MockProbe>,
        clock: Arc<ManualClock>,
    }

    fn harness(gateways: &[(&str, &str)], settings: UptimeSettings) -> Harness {
        let probe = Arc::new(MockProbe::new());
        let clock = Arc::new(ManualClock::new(START_MS));
        let tracker =
            GatewayUptimeTracker::new(table(gateways), probe.clone(), clock.clone(), settings);
        Harness {
            tracker,
            probe,
            clock,
        }
    }

    #[tokio::test]
    async fn test_check_caches_within_ttl() {
        let h = harness(&[("alpha", "eu")], UptimeSettings::default());
        h.probe.respond(url("alpha"), MockResponse::Body(Vec::new()));

        let first = h.tracker.check_gateway("alpha").await.unwrap();
        assert!(first.ok);
        assert_eq!(first.timestamp_ms, START_MS);

        for _ in 0..5 {
            h.clock.advance(Duration::from_secs(100));
            let again = h.tracker.check_gateway("alpha").await.unwrap();
            assert_eq!(again, first);
        }
        assert_eq!(h.probe.calls(&url("alpha")), 1);
    }

    #[tokio::test]
    async fn test_check_reprobes_once_after_ttl() {
        let h = harness(&[("alpha", "eu")], UptimeSettings::default());
        h.probe.respond(url("alpha"), MockResponse::Body(Vec::new()));

        h.tracker.check_gateway("alpha").await.unwrap();
        h.clock.advance(Duration::from_secs(600));
        h.tracker.check_gateway("alpha").await.unwrap();
        assert_eq!(h.probe.calls(&url("alpha")), 1);

        h.clock.advance(Duration::from_millis(1));
        let refreshed = h.tracker.check_gateway("alpha").await.unwrap();
        assert_eq!(h.probe.calls(&url("alpha")), 2);
        assert_eq!(refreshed.timestamp_ms, START_MS + 600_001);

        h.tracker.check_gateway("alpha").await.unwrap();
        assert_eq!(h.probe.calls(&url("alpha")), 2);
    }

    #[tokio::test]
    async fn test_failure_is_cached_for_ttl() {
        let h = harness(&[("alpha", "eu")], UptimeSettings::default());
        h.probe
            .respond(url("alpha"), MockResponse::Fail("connection refused".into()));

        assert!(!h.tracker.check_gateway("alpha").await.unwrap().ok);

        h.probe.respond(url("alpha"), MockResponse::Body(Vec::new()));
        h.clock.advance(Duration::from_secs(300));
        assert!(!h.tracker.check_gateway("alpha").await.unwrap().ok);
        assert_eq!(h.probe.total_calls(), 1);

        h.clock.advance(Duration::from_secs(301));
        assert!(h.tracker.check_gateway("alpha").await.unwrap().ok);
        assert_eq!(h.probe.total_calls(), 2);
    }

    #[tokio::test]
    async fn test_hash_mismatch_is_unhealthy() {
        let h = harness(&[("alpha", "eu")], UptimeSettings::default());
        h.probe
            .respond(url("alpha"), MockResponse::Body(b"tampered".to_vec()));
        assert!(!h.tracker.check_gateway("alpha").await.unwrap().ok);
    }

    #[tokio::test]
    async fn test_bad_status_is_unhealthy() {
        let h = harness(&[("alpha", "eu")], UptimeSettings::default());
        h.probe.respond(url("alpha"), MockResponse::Status(502));
        assert!(!h.tracker.check_gateway("alpha").await.unwrap().ok);
    }

    #[tokio::test]
    async fn test_timeout_is_unhealthy() {
        let settings = UptimeSettings {
            probe_timeout: Duration::from_millis(50),
            ..UptimeSettings::default()
        };
        let h = harness(&[("alpha", "eu")], settings);
        h.probe.respond(url("alpha"), MockResponse::Hang);

        let started = std::time::Instant::now();
        let result = h.tracker.check_gateway("alpha").await.unwrap();
        assert!(!result.ok);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_unknown_gateway_not_found() {
        let h = harness(&[("alpha", "eu")], UptimeSettings::default());
        assert_eq!(
            h.tracker.check_gateway("omega").await,
            Err(LookupError::GatewayNotFound("omega".to_string()))
        );
        assert_eq!(h.probe.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_list_healthy_filters_by_continent_and_health() {
        let h = harness(
            &[
                ("eu-1", "eu"),
                ("na-1", "na"),
                ("eu-2", "eu"),
                ("eu-3", "eu"),
                ("eu-4", "eu"),
            ],
            UptimeSettings::default(),
        );
        h.probe.respond(url("eu-1"), MockResponse::Body(Vec::new()));
        h.probe.respond(url("na-1"), MockResponse::Body(Vec::new()));
        h.probe.respond(url("eu-2"), MockResponse::Fail("reset".into()));
        h.probe.respond(url("eu-3"), MockResponse::Body(Vec::new()));
        h.probe
            .respond(url("eu-4"), MockResponse::Body(b"stale build".to_vec()));

        let healthy = h.tracker.list_healthy_gateways("eu").await;
        assert_eq!(healthy, vec!["eu-1".to_string(), "eu-3".to_string()]);
        assert_eq!(h.probe.calls(&url("na-1")), 0);

        assert_eq!(
            h.tracker.list_healthy_gateways("na").await,
            vec!["na-1".to_string()]
        );
        assert!(h.tracker.list_healthy_gateways("oc").await.is_empty());
    }

    #[tokio::test]
    async fn test_list_healthy_respects_cached_failure() {
        let h = harness(&[("eu-1", "eu")], UptimeSettings::default());
        h.probe.respond(url("eu-1"), MockResponse::Status(500));
        assert!(h.tracker.list_healthy_gateways("eu").await.is_empty());

        h.probe.respond(url("eu-1"), MockResponse::Body(Vec::new()));
        assert!(h.tracker.list_healthy_gateways("eu").await.is_empty());
        assert_eq!(h.probe.total_calls(), 1);
    }

    #[tokio::test]
    async fn test_list_healthy_is_deterministic() {
        let h = harness(
            &[("c", "eu"), ("a", "eu"), ("b", "eu")],
            UptimeSettings::default(),
        );
        for id in ["a", "b", "c"] {
            h.probe.respond(url(id), MockResponse::Body(Vec::new()));
        }
        let expected = vec!["c".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(h.tracker.list_healthy_gateways("eu").await, expected);
        assert_eq!(h.tracker.list_healthy_gateways("eu").await, expected);
    }

    #[tokio::test]
    async fn test_store_never_replaces_newer_result() {
        let h = harness(&[("alpha", "eu")], UptimeSettings::default());

        let newer = UptimeResult {
            ok: true,
            timestamp_ms: START_MS + 10,
        };
        let older = UptimeResult {
            ok: false,
            timestamp_ms: START_MS + 5,
        };

        let alpha = h.tracker.gateways().get("alpha").unwrap().clone();
        assert_eq!(h.tracker.store(&alpha, newer), newer);
        assert_eq!(h.tracker.store(&alpha, older), newer);
        assert_eq!(h.tracker.cached("alpha"), Some(newer));

        let newest = UptimeResult {
            ok: false,
            timestamp_ms: START_MS + 20,
        };
        assert_eq!(h.tracker.store(&alpha, newest), newest);
    }

    #[tokio::test]
    async fn test_refresh_all_summary() {
        let h = harness(
            &[("eu-1", "eu"), ("na-1", "na"), ("as-1", "as")],
            UptimeSettings::default(),
        );
        h.probe.respond(url("eu-1"), MockResponse::Body(Vec::new()));
        h.probe.respond(url("na-1"), MockResponse::Body(Vec::new()));

        let summary = h.tracker.refresh_all().await;
        assert_eq!(
            summary,
            RefreshSummary {
                healthy: 2,
                unhealthy: 1
            }
        );

        h.tracker.refresh_all().await;
        assert_eq!(h.probe.total_calls(), 3);
    }

    #[tokio::test]
    async fn test_replace_gateways_prunes_cache() {
        let h = harness(&[("eu-1", "eu"), ("eu-2", "eu")], UptimeSettings::default());
        h.probe.respond(url("eu-1"), MockResponse::Body(Vec::new()));
        h.probe.respond(url("eu-2"), MockResponse::Body(Vec::new()));
        h.tracker.refresh_all().await;
        assert!(h.tracker.cached("eu-2").is_some());

        h.tracker.replace_gateways(table(&[("eu-1", "eu")]));
        assert!(h.tracker.cached("eu-1").is_some());
        assert!(h.tracker.cached("eu-2").is_none());
        assert_eq!(h.tracker.gateways().len(), 1);
        assert!(h.tracker.check_gateway("eu-2").await.is_err());
    }

    #[tokio::test]
    async fn test_replace_gateways_drops_result_for_changed_url() {
        let probe = Arc::new(MockProbe::new());
        let clock = Arc::new(ManualClock::new(START_MS));
        let tracker = GatewayUptimeTracker::new(
            table_with_urls(&[
                ("alpha", "eu", "https://old.example/ipfs"),
                ("beta", "eu", "https://beta.example/ipfs"),
            ]),
            probe.clone(),
            clock,
            UptimeSettings::default(),
        );
        let old_url = format!("https://old.example/ipfs/{}", CONTENT_ID);
        let new_url = format!("https://dead.example/ipfs/{}", CONTENT_ID);
        let beta_url = format!("https://beta.example/ipfs/{}", CONTENT_ID);
        probe.respond(old_url.as_str(), MockResponse::Body(Vec::new()));
        probe.respond(beta_url.as_str(), MockResponse::Body(Vec::new()));
        tracker.refresh_all().await;
        assert!(tracker.cached("alpha").unwrap().ok);

        tracker.replace_gateways(table_with_urls(&[
            ("alpha", "eu", "https://dead.example/ipfs"),
            ("beta", "eu", "https://beta.example/ipfs"),
        ]));
        assert!(tracker.cached("alpha").is_none());
        assert!(tracker.cached("beta").is_some());

        assert!(!tracker.check_gateway("alpha").await.unwrap().ok);
        assert_eq!(probe.calls(&new_url), 1);
        assert!(tracker.check_gateway("beta").await.unwrap().ok);
        assert_eq!(probe.calls(&beta_url), 1);
    }

    #[tokio::test]
    async fn test_result_for_replaced_record_is_not_cached() {
        let h = harness(&[("alpha", "eu")], UptimeSettings::default());
        let stale_record = h.tracker.gateways().get("alpha").unwrap().clone();

        h.tracker.replace_gateways(table_with_urls(&[(
            "alpha",
            "eu",
            "https://moved.example/ipfs/:hash",
        )]));

        let late = UptimeResult {
            ok: true,
            timestamp_ms: START_MS,
        };
        h.tracker.store(&stale_record, late);
        assert!(h.tracker.cached("alpha").is_none());
    }

    #[derive(Default)]
    struct RecordingObserver {
        seen: Mutex<Vec<(String, &'static str)>>,
    }

    impl ProbeObserver for RecordingObserver {
        fn observe(&self, gateway_id: &str, outcome: &Result<(), ProbeError>, _elapsed: Duration) {
            self.seen
                .lock()
                .unwrap()
                .push((gateway_id.to_string(), outcome_label(outcome)));
        }
    }

    #[tokio::test]
    async fn test_observer_sees_final_verdict() {
        let probe = Arc::new(MockProbe::new());
        let observer = Arc::new(RecordingObserver::default());
        let tracker = GatewayUptimeTracker::new_observed(
            table(&[("ok", "eu"), ("tampered", "eu"), ("slow", "eu"), ("down", "eu")]),
            probe.clone(),
            Arc::new(ManualClock::new(START_MS)),
            observer.clone(),
            UptimeSettings {
                probe_timeout: Duration::from_millis(50),
                ..UptimeSettings::default()
            },
        );
        probe.respond(url("ok"), MockResponse::Body(Vec::new()));
        probe.respond(url("tampered"), MockResponse::Body(b"stale".to_vec()));
        probe.respond(url("slow"), MockResponse::Hang);
        probe.respond(url("down"), MockResponse::Status(503));

        tracker.refresh_all().await;

        let mut seen = observer.seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(
            seen,
            vec![
                ("down".to_string(), "bad_status"),
                ("ok".to_string(), "ok"),
                ("slow".to_string(), "timeout"),
                ("tampered".to_string(), "integrity_mismatch"),
            ]
        );

        // Cache hits are not reported.
        tracker.refresh_all().await;
        assert_eq!(observer.seen.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome_label(&Ok(())), "ok");
        assert_eq!(outcome_label(&Err(ProbeError::Timeout(1500))), "timeout");
        assert_eq!(
            outcome_label(&Err(ProbeError::Network("reset".into()))),
            "network_error"
        );
        assert_eq!(outcome_label(&Err(ProbeError::Status(404))), "bad_status");
        assert_eq!(
            outcome_label(&Err(ProbeError::BodyTooLarge(16))),
            "body_too_large"
        );
        assert_eq!(
            outcome_label(&Err(ProbeError::IntegrityMismatch)),
            "integrity_mismatch"
        );
    }

    #[tokio::test]
    async fn test_concurrent_checks_leave_single_entry() {
        let h = harness(&[("alpha", "eu")], UptimeSettings::default());
        h.probe.respond(url("alpha"), MockResponse::Body(Vec::new()));

        let mut tasks = JoinSet::new();
        for _ in 0..8 {
            let tracker = h.tracker.clone();
            tasks.spawn(async move { tracker.check_gateway("alpha").await.unwrap() });
        }
        while let Some(result) = tasks.join_next().await {
            assert!(result.unwrap().ok);
        }

        let cached = h.tracker.cached("alpha").unwrap();
        assert!(cached.ok);
        assert_eq!(cached.timestamp_ms, START_MS);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(10);
        clock.advance(Duration::from_millis(5));
        assert_eq!(clock.now_ms(), 15);
        clock.set(1);
        assert_eq!(clock.now_ms(), 1);
    }

    #[test]
    fn test_default_settings() {
        let settings = UptimeSettings::default();
        assert_eq!(settings.probe_timeout, Duration::from_millis(1500));
        assert_eq!(settings.ttl, Duration::from_secs(600));
    }
}
