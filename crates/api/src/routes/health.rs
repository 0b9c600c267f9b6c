//! Health check endpoint handlers.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub catalog: CatalogHealth,
}

/// Summary of the active catalog snapshot.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CatalogHealth {
    pub version: String,
    pub plans: usize,
    pub gateways: usize,
    /// Gateways with a fresh, healthy uptime result.
    pub gateways_healthy: usize,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Full health check endpoint.
///
/// Reports the active catalog and the cached gateway health. Never probes.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.snapshot.load();
    let gateways = state.tracker.gateways();
    let gateways_healthy = gateways
        .iter()
        .filter(|g| state.tracker.cached(&g.id).is_some_and(|r| r.ok))
        .count();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        catalog: CatalogHealth {
            version: snapshot.version().to_string(),
            plans: snapshot.catalog().len(),
            gateways: gateways.len(),
            gateways_healthy,
        },
    })
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 OK once a catalog with at least one plan is active.
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    if state.snapshot.load().catalog().is_empty() {
        Err(ApiError::ServiceUnavailable("Catalog has no plans".to_string()))
    } else {
        Ok(Json(StatusResponse {
            status: "ready".to_string(),
        }))
    }
}
