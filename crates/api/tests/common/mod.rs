//! Common test utilities for integration tests.
//!
//! The app is built over the shipped catalog with an in-memory probe and a
//! hand-driven clock, so no test touches the network.

// Helpers are shared across test binaries; not every binary uses every one.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use domain::services::{GatewayUptimeTracker, ManualClock, MockProbe, MockResponse};
use domain::snapshot::SnapshotHandle;
use edge_config_api::{app::create_app, catalog::load_catalog, config::Config};

/// Epoch milliseconds the test clock starts at.
pub const START_MS: i64 = 1_760_000_000_000;

/// Path of the catalog shipped with the service.
pub fn catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/catalog.json")
}

/// Test configuration pointing at the shipped catalog.
pub fn test_config() -> Config {
    let path = catalog_path();
    Config::load_for_test(&[("catalog.path", path.to_string_lossy().as_ref())])
        .expect("Failed to load test config")
}

/// Application plus handles on its collaborators.
pub struct TestContext {
    pub app: Router,
    pub snapshot: Arc<SnapshotHandle>,
    pub tracker: GatewayUptimeTracker,
    pub probe: Arc<MockProbe>,
    pub clock: Arc<ManualClock>,
}

impl TestContext {
    /// URL the tracker fetches for `gateway_id`.
    pub fn probe_url(&self, gateway_id: &str) -> String {
        self.tracker
            .gateways()
            .get(gateway_id)
            .unwrap_or_else(|| panic!("unknown gateway {}", gateway_id))
            .probe_url()
    }

    /// Makes `gateway_id` serve the fixture content.
    pub fn serve_fixture(&self, gateway_id: &str) {
        self.probe
            .respond(self.probe_url(gateway_id), MockResponse::Body(Vec::new()));
    }

    /// Makes `gateway_id` fail every probe.
    pub fn break_gateway(&self, gateway_id: &str) {
        self.probe.respond(
            self.probe_url(gateway_id),
            MockResponse::Fail("connection refused".to_string()),
        );
    }

    /// Makes `gateway_id` serve content that fails the integrity check.
    pub fn tamper_gateway(&self, gateway_id: &str) {
        self.probe.respond(
            self.probe_url(gateway_id),
            MockResponse::Body(b"<html>stale</html>".to_vec()),
        );
    }
}

/// Create a test application over the shipped catalog.
pub async fn test_context() -> TestContext {
    let config = test_config();
    let snapshot = load_catalog(&config.catalog.path)
        .await
        .expect("Failed to load shipped catalog");
    let snapshot = Arc::new(SnapshotHandle::new(snapshot));

    let probe = Arc::new(MockProbe::new());
    let clock = Arc::new(ManualClock::new(START_MS));
    let tracker = GatewayUptimeTracker::new(
        snapshot.load().gateways(),
        probe.clone(),
        clock.clone(),
        config.uptime.settings(),
    );

    let app = create_app(config, Arc::clone(&snapshot), tracker.clone());

    TestContext {
        app,
        snapshot,
        tracker,
        probe,
        clock,
    }
}

/// Build a GET request.
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Build a GET request carrying an `Origin` header.
pub fn get_request_with_origin(uri: &str, origin: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::ORIGIN, origin)
        .body(Body::empty())
        .unwrap()
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}
