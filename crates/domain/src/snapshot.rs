//! Immutable configuration snapshot.
//!
//! A snapshot is validated as a whole. Any integrity violation rejects the
//! entire document, so a partially valid catalog is never served.

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Deserialize;
use tracing::info;

use crate::error::SnapshotError;
use crate::models::gateway::{GatewayTable, RawFixture, RawGateway};
use crate::models::host::HostPolicy;
use crate::models::plan::RawPlan;
use crate::services::plan_resolution::{PlanCatalog, PlanResolver};
use crate::services::region_routing::{RawRouting, RegionRouter};

/// The catalog document as it appears on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawSnapshot {
    #[serde(default)]
    pub version: String,
    pub plans: BTreeMap<String, RawPlan>,
    #[serde(default)]
    pub storefront_products: BTreeMap<String, String>,
    pub regions: Vec<String>,
    pub continents: BTreeMap<String, String>,
    pub default_continent: String,
    pub default_continent_code: String,
    pub default_continent_code_backup: String,
    pub default_region: String,
    #[serde(default)]
    pub allowed_hosts: Vec<String>,
    #[serde(default)]
    pub fixtures: BTreeMap<String, RawFixture>,
    #[serde(default)]
    pub gateways: Vec<RawGateway>,
}

/// Validated plan, routing, host and gateway tables.
#[derive(Debug)]
pub struct ConfigSnapshot {
    version: String,
    catalog: PlanCatalog,
    router: RegionRouter,
    hosts: HostPolicy,
    gateways: Arc<GatewayTable>,
}

impl ConfigSnapshot {
    /// Parses and validates a catalog document.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let raw: RawSnapshot = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: RawSnapshot) -> Result<Self, SnapshotError> {
        let catalog = PlanCatalog::from_raw(raw.plans, raw.storefront_products)?;
        let router = RegionRouter::from_raw(RawRouting {
            regions: raw.regions,
            continents: raw.continents,
            default_continent: raw.default_continent,
            default_continent_code: raw.default_continent_code,
            default_continent_code_backup: raw.default_continent_code_backup,
            default_region: raw.default_region,
        })?;
        let hosts = HostPolicy::from_raw(raw.allowed_hosts)?;
        let gateways = GatewayTable::from_raw(raw.fixtures, raw.gateways, |code| {
            router.is_recognized_continent(code)
        })?;

        let snapshot = Self {
            version: raw.version,
            catalog,
            router,
            hosts,
            gateways: Arc::new(gateways),
        };

        info!(
            version = %snapshot.version,
            plans = snapshot.catalog.len(),
            storefront_products = snapshot.catalog.storefront_products(),
            hosts = snapshot.hosts.len(),
            gateways = snapshot.gateways.len(),
            "Catalog snapshot validated"
        );

        Ok(snapshot)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    pub fn plan_resolver(&self) -> PlanResolver<'_> {
        PlanResolver::new(&self.catalog)
    }

    pub fn router(&self) -> &RegionRouter {
        &self.router
    }

    pub fn hosts(&self) -> &HostPolicy {
        &self.hosts
    }

    /// Shared gateway table, handed to the uptime tracker.
    pub fn gateways(&self) -> Arc<GatewayTable> {
        Arc::clone(&self.gateways)
    }
}

/// Atomically swappable handle to the active snapshot.
///
/// Readers get a consistent `Arc` for the whole request; a reload never
/// mutates a snapshot someone is holding.
#[derive(Debug)]
pub struct SnapshotHandle {
    current: ArcSwap<ConfigSnapshot>,
}

impl SnapshotHandle {
    pub fn new(snapshot: ConfigSnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    pub fn load(&self) -> Arc<ConfigSnapshot> {
        self.current.load_full()
    }

    /// Installs `snapshot` and returns the one it replaced.
    pub fn replace(&self, snapshot: ConfigSnapshot) -> Arc<ConfigSnapshot> {
        let previous = self.current.swap(Arc::new(snapshot));
        info!(
            previous = %previous.version,
            current = %self.current.load().version,
            "Catalog snapshot replaced"
        );
        previous
    }
}
