//! Domain models for the edge-config catalog.

pub mod gateway;
pub mod host;
pub mod plan;

pub use gateway::{GatewayRecord, GatewayTable, UptimeFixture, UptimeResult};
pub use host::HostPolicy;
pub use plan::{
    BillingSpec, EntitlementSet, GiftPackItem, PlanDefinition, ProFeatures, SessionLimit,
    FEATURE_FLAG_NAMES,
};
