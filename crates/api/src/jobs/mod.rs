//! Background job scheduler and job implementations.

mod scheduler;
mod uptime_refresh;

pub use scheduler::{Job, JobFrequency, JobScheduler};
pub use uptime_refresh::UptimeRefreshJob;
