//! Domain layer for the edge-config service.
//!
//! This crate contains:
//! - Domain models (plans, hosts, gateways)
//! - Resolution services (plans, regions, gateway uptime)
//! - The validated configuration snapshot
//! - Domain error types
//!
//! Nothing here depends on the HTTP stack.

pub mod error;
pub mod models;
pub mod services;
pub mod snapshot;

pub use error::{LookupError, SnapshotError};
pub use snapshot::{ConfigSnapshot, RawSnapshot, SnapshotHandle};
