//! Plan entitlement endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::{EntitlementSet, GiftPackItem};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;

/// Plan code listing.
#[derive(Debug, Serialize)]
pub struct PlanListResponse {
    pub plans: Vec<String>,
    pub count: usize,
}

/// Contents of a gift pack plan.
#[derive(Debug, Serialize)]
pub struct GiftPackResponse {
    pub plan_code: String,
    pub items: Vec<GiftPackItemResponse>,
}

#[derive(Debug, Serialize)]
pub struct GiftPackItemResponse {
    pub plan: String,
    pub quantity: u32,
    pub trial_months: u32,
}

impl From<&GiftPackItem> for GiftPackItemResponse {
    fn from(item: &GiftPackItem) -> Self {
        Self {
            plan: item.plan.clone(),
            quantity: item.quantity,
            trial_months: item.trial_months,
        }
    }
}

/// Plan purchased through a storefront product.
#[derive(Debug, Serialize)]
pub struct StorefrontResponse {
    pub product_id: String,
    pub plan_code: String,
    pub entitlements: EntitlementSet,
}

/// List every plan code in the active catalog.
///
/// GET /api/v1/plans
pub async fn list_plans(State(state): State<AppState>) -> Json<PlanListResponse> {
    let snapshot = state.snapshot.load();
    let plans: Vec<String> = snapshot
        .catalog()
        .plan_codes()
        .into_iter()
        .map(str::to_string)
        .collect();

    Json(PlanListResponse {
        count: plans.len(),
        plans,
    })
}

/// Resolve the entitlements of a plan.
///
/// GET /api/v1/plans/:code
pub async fn get_plan(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<EntitlementSet>, ApiError> {
    let snapshot = state.snapshot.load();
    let entitlements = snapshot.plan_resolver().resolve_entitlements(&code)?;
    Ok(Json(entitlements))
}

/// Expand a gift pack plan into its bundled plans.
///
/// GET /api/v1/plans/:code/gift-pack
///
/// Plans that are not gift packs expand to an empty list; unknown plans are
/// 404.
pub async fn get_gift_pack(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<GiftPackResponse>, ApiError> {
    let snapshot = state.snapshot.load();
    let resolver = snapshot.plan_resolver();
    resolver.resolve_entitlements(&code)?;

    let items = resolver
        .expand_gift_pack(&code)
        .iter()
        .map(GiftPackItemResponse::from)
        .collect();

    Ok(Json(GiftPackResponse {
        plan_code: code,
        items,
    }))
}

/// Resolve a storefront product id to its plan.
///
/// GET /api/v1/storefront/:product_id
pub async fn get_storefront_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<StorefrontResponse>, ApiError> {
    let snapshot = state.snapshot.load();
    let resolver = snapshot.plan_resolver();
    let plan_code = resolver.resolve_storefront_purchase(&product_id)?;
    let entitlements = resolver.resolve_entitlements(plan_code)?;

    Ok(Json(StorefrontResponse {
        plan_code: plan_code.to_string(),
        product_id,
        entitlements,
    }))
}
