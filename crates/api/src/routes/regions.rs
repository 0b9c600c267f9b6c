//! Region routing endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::services::RoutingDefaults;
use serde::Serialize;

use crate::app::AppState;

/// Routing decision for one continent code.
#[derive(Debug, Serialize)]
pub struct RegionResponse {
    /// The code as looked up (trimmed and lowercased).
    pub continent_code: String,
    pub recognized: bool,
    pub region: String,
    /// Deterministic fallback order, starting with `region`.
    pub region_chain: Vec<String>,
}

/// Default continent, backup continent and default region.
///
/// GET /api/v1/regions/defaults
pub async fn get_defaults(State(state): State<AppState>) -> Json<RoutingDefaults> {
    Json(state.snapshot.load().router().defaults().clone())
}

/// Resolve the region serving a continent. Total: unknown codes get the
/// default region.
///
/// GET /api/v1/regions/:continent
pub async fn get_region(
    State(state): State<AppState>,
    Path(continent): Path<String>,
) -> Json<RegionResponse> {
    let snapshot = state.snapshot.load();
    let router = snapshot.router();
    let code = continent.trim().to_ascii_lowercase();

    Json(RegionResponse {
        recognized: router.is_recognized_continent(&code),
        region: router.resolve_region(&code).to_string(),
        region_chain: router
            .region_chain(&code)
            .into_iter()
            .map(str::to_string)
            .collect(),
        continent_code: code,
    })
}
