//! CORS policy backed by the catalog's allowed hosts.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header::HeaderName, request::Parts, HeaderValue, Method};
use domain::snapshot::SnapshotHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::trace_id::REQUEST_ID_HEADER;

/// Builds a CORS layer that allows exactly the origins whose host is in the
/// active snapshot's allowed-host list. Reloads take effect immediately.
pub fn cors_layer(snapshot: Arc<SnapshotHandle>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .map(|origin| snapshot.load().hosts().is_allowed_origin(origin))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .max_age(Duration::from_secs(3600))
}
