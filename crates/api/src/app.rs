use axum::{middleware, routing::get, Router};
use domain::services::GatewayUptimeTracker;
use domain::snapshot::SnapshotHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::Config;
use crate::middleware::{cors_layer, metrics_handler, metrics_middleware, trace_id};
use crate::routes::{gateways, health, plans, regions};

#[derive(Clone)]
pub struct AppState {
    pub snapshot: Arc<SnapshotHandle>,
    pub tracker: GatewayUptimeTracker,
}

pub fn create_app(
    config: Config,
    snapshot: Arc<SnapshotHandle>,
    tracker: GatewayUptimeTracker,
) -> Router {
    let state = AppState {
        snapshot: snapshot.clone(),
        tracker,
    };

    // Catalog routes (read-only, no authentication)
    let api_routes = Router::new()
        .route("/api/v1/plans", get(plans::list_plans))
        .route("/api/v1/plans/:code", get(plans::get_plan))
        .route("/api/v1/plans/:code/gift-pack", get(plans::get_gift_pack))
        .route(
            "/api/v1/storefront/:product_id",
            get(plans::get_storefront_product),
        )
        .route("/api/v1/regions/defaults", get(regions::get_defaults))
        .route("/api/v1/regions/:continent", get(regions::get_region))
        .route("/api/v1/gateways", get(gateways::list_gateways))
        .route(
            "/api/v1/gateways/:id/uptime",
            get(gateways::get_gateway_uptime),
        );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(snapshot))
        .with_state(state)
}
