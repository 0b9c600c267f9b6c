//! Content gateway endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, SecondsFormat, Utc};
use domain::services::RegionRouter;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// Query parameters for the healthy gateway listing.
#[derive(Debug, Deserialize, Validate)]
pub struct GatewayQuery {
    /// Client continent code; the default continent when absent.
    #[validate(custom(function = "shared::validation::validate_continent_code"))]
    pub continent: Option<String>,
}

/// A healthy gateway.
#[derive(Debug, Serialize)]
pub struct GatewayEntry {
    pub id: String,
    pub url: String,
}

/// Healthy gateways for the continent actually served.
#[derive(Debug, Serialize)]
pub struct GatewayListResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_continent: Option<String>,
    pub continent_code: String,
    pub region: String,
    /// True when the served continent differs from the requested one, or
    /// from the default continent when none was requested.
    pub fallback: bool,
    pub gateways: Vec<GatewayEntry>,
}

/// Result of one gateway uptime check.
#[derive(Debug, Serialize)]
pub struct GatewayUptimeResponse {
    pub gateway_id: String,
    pub continent_code: String,
    pub ok: bool,
    pub timestamp_ms: i64,
    pub checked_at: String,
}

/// Continents to try, in order, for a client continent code.
///
/// A recognized code comes first, followed by the default and backup
/// continents. Duplicates are dropped.
pub fn continent_candidates(router: &RegionRouter, requested: Option<&str>) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::with_capacity(3);

    if let Some(code) = requested.filter(|c| router.is_recognized_continent(c)) {
        candidates.push(code.to_string());
    }
    for code in [
        router.default_continent_code(),
        router.default_continent_code_backup(),
    ] {
        if !candidates.iter().any(|c| c == code) {
            candidates.push(code.to_string());
        }
    }

    candidates
}

/// List healthy gateways near the client.
///
/// GET /api/v1/gateways?continent=xx
///
/// Tries the client continent, then the default continent, then the backup
/// continent, and serves the first one with at least one healthy gateway.
pub async fn list_gateways(
    State(state): State<AppState>,
    Query(query): Query<GatewayQuery>,
) -> Result<Json<GatewayListResponse>, ApiError> {
    query.validate()?;

    let requested = query
        .continent
        .as_deref()
        .map(|c| c.trim().to_ascii_lowercase());

    let snapshot = state.snapshot.load();
    let router = snapshot.router();
    let candidates = continent_candidates(router, requested.as_deref());

    let mut served = None;
    for continent in &candidates {
        let healthy = state.tracker.list_healthy_gateways(continent).await;
        if !healthy.is_empty() {
            served = Some((continent.clone(), healthy));
            break;
        }
    }

    let (continent_code, healthy) = match served {
        Some(found) => found,
        None => {
            tracing::warn!(
                requested = ?requested,
                tried = ?candidates,
                "No healthy gateways in any candidate continent"
            );
            (
                candidates
                    .first()
                    .cloned()
                    .unwrap_or_else(|| router.default_continent_code().to_string()),
                Vec::new(),
            )
        }
    };

    let table = state.tracker.gateways();
    let gateways = healthy
        .into_iter()
        .filter_map(|id| table.get(&id).map(|g| g.url.clone()).map(|url| GatewayEntry { id, url }))
        .collect();

    let fallback = requested
        .as_deref()
        .unwrap_or_else(|| router.default_continent_code())
        != continent_code;

    Ok(Json(GatewayListResponse {
        fallback,
        region: router.resolve_region(&continent_code).to_string(),
        requested_continent: requested,
        continent_code,
        gateways,
    }))
}

/// Check one gateway, probing only when its cached result is stale.
///
/// GET /api/v1/gateways/:id/uptime
pub async fn get_gateway_uptime(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GatewayUptimeResponse>, ApiError> {
    let result = state.tracker.check_gateway(&id).await?;
    let continent_code = state
        .tracker
        .gateways()
        .get(&id)
        .map(|g| g.continent_code.clone())
        .unwrap_or_default();

    Ok(Json(GatewayUptimeResponse {
        gateway_id: id,
        continent_code,
        ok: result.ok,
        timestamp_ms: result.timestamp_ms,
        checked_at: format_timestamp(result.timestamp_ms),
    }))
}

fn format_timestamp(timestamp_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}
