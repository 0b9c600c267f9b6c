//! Prometheus metrics middleware.
//!
//! Provides HTTP request metrics, gateway probe metrics and the exporter.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::services::{outcome_label, ProbeError, ProbeObserver};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Middleware to record HTTP request metrics.
///
/// Records the following metrics:
/// - `http_requests_total`: Counter with labels (method, path, status)
/// - `http_request_duration_seconds`: Histogram with labels (method, path)
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = method_to_str(req.method());
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(
        "http_requests_total",
        "method" => method,
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(duration);

    response
}

/// Convert HTTP method to string for metric labels.
fn method_to_str(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::PATCH => "PATCH",
        Method::HEAD => "HEAD",
        Method::OPTIONS => "OPTIONS",
        _ => "OTHER",
    }
}

/// Record the outcome and latency of one gateway probe.
pub fn record_gateway_probe(outcome: &'static str, duration_secs: f64) {
    counter!("gateway_probes_total", "outcome" => outcome).increment(1);
    histogram!("gateway_probe_duration_seconds", "outcome" => outcome).record(duration_secs);
}

/// Records every gateway probe verdict, labelled by its final outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbeMetrics;

impl ProbeObserver for ProbeMetrics {
    fn observe(&self, _gateway_id: &str, outcome: &Result<(), ProbeError>, elapsed: Duration) {
        record_gateway_probe(outcome_label(outcome), elapsed.as_secs_f64());
    }
}

/// Record the result of a full uptime refresh pass.
pub fn record_gateway_health(healthy: usize, unhealthy: usize) {
    gauge!("gateways_healthy").set(healthy as f64);
    gauge!("gateways_unhealthy").set(unhealthy as f64);
}

/// Record a catalog reload attempt.
pub fn record_catalog_reload(success: bool) {
    let result = if success { "success" } else { "rejected" };
    counter!("catalog_reloads_total", "result" => result).increment(1);
}

/// Handler for /metrics endpoint that returns Prometheus text format.
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS_HANDLE.get() {
        Some(Ok(handle)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        ),
    }
}

static PROMETHEUS_HANDLE: OnceLock<Result<PrometheusHandle, String>> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Installs the global recorder on the first call; later calls return the
/// outcome of that first attempt.
pub fn init_metrics() -> Result<(), String> {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            PrometheusBuilder::new()
                .set_buckets(&[0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 1.5, 2.0, 5.0])
                .and_then(|builder| builder.install_recorder())
                .map_err(|e| e.to_string())
        })
        .as_ref()
        .map(|_| ())
        .map_err(Clone::clone)
}
