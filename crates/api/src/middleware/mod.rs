//! HTTP middleware components.

pub mod cors;
pub mod logging;
pub mod metrics;
pub mod trace_id;

pub use cors::cors_layer;
pub use metrics::{init_metrics, metrics_handler, metrics_middleware, ProbeMetrics};
pub use trace_id::{trace_id, RequestId, REQUEST_ID_HEADER};
