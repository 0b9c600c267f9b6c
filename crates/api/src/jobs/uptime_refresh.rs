//! Background job that keeps the gateway uptime cache warm.

use domain::services::GatewayUptimeTracker;
use tracing::info;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::metrics::record_gateway_health;

/// Periodically re-checks every gateway whose cached result went stale.
pub struct UptimeRefreshJob {
    tracker: GatewayUptimeTracker,
    interval_secs: u64,
}

impl UptimeRefreshJob {
    pub fn new(tracker: GatewayUptimeTracker, interval_secs: u64) -> Self {
        Self {
            tracker,
            interval_secs,
        }
    }
}

#[async_trait::async_trait]
impl Job for UptimeRefreshJob {
    fn name(&self) -> &'static str {
        "uptime_refresh"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(self.interval_secs)
    }

    fn run_on_start(&self) -> bool {
        true
    }

    async fn execute(&self) -> Result<(), String> {
        let summary = self.tracker.refresh_all().await;
        record_gateway_health(summary.healthy, summary.unhealthy);
        info!(
            healthy = summary.healthy,
            unhealthy = summary.unhealthy,
            "Gateway uptime refreshed"
        );
        Ok(())
    }
}
