//! Domain services for the edge-config catalog.
//!
//! Services contain the resolution logic that operates on domain models.

pub mod plan_resolution;
pub mod region_routing;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod uptime;

pub use plan_resolution::{PlanCatalog, PlanResolver};

pub use region_routing::{RawRouting, RegionRouter, RoutingDefaults};

#[cfg(any(test, feature = "test-utils"))]
pub use testing::{ManualClock, MockProbe, MockResponse};

pub use uptime::{
    outcome_label, Clock, GatewayProbe, GatewayUptimeTracker, ProbeError, ProbeObserver,
    RefreshSummary, SystemClock, UptimeSettings,
};
