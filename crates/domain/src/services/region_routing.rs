//! Continent to region routing.
//!
//! `resolve_region` is total: any input, including codes the table has never
//! seen, yields a region. Choosing a continent when the client's cannot be
//! determined is left to callers, who should use the default and backup
//! continent codes exposed here so every caller applies the same policy.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use shared::validation::is_continent_code;

use crate::error::SnapshotError;

/// Routing tables as they appear in the catalog file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawRouting {
    /// Every region a continent may be routed to.
    pub regions: Vec<String>,
    /// Recognized continent code to region.
    pub continents: BTreeMap<String, String>,
    pub default_continent: String,
    pub default_continent_code: String,
    pub default_continent_code_backup: String,
    pub default_region: String,
}

/// Default continent and region values, for callers and API output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RoutingDefaults {
    pub default_continent: String,
    pub default_continent_code: String,
    pub default_continent_code_backup: String,
    pub default_region: String,
}

/// Immutable continent to region router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRouter {
    regions: BTreeSet<String>,
    continents: BTreeMap<String, String>,
    defaults: RoutingDefaults,
}

impl RegionRouter {
    /// Validates the routing tables.
    ///
    /// Every continent must map to a recognized region, and the default
    /// continent codes and region must themselves be recognized.
    pub fn from_raw(raw: RawRouting) -> Result<Self, SnapshotError> {
        let regions: BTreeSet<String> = raw.regions.into_iter().collect();

        for (continent, region) in &raw.continents {
            if !is_continent_code(continent) {
                return Err(SnapshotError::InvalidContinentCode(continent.clone()));
            }
            if !regions.contains(region) {
                return Err(SnapshotError::UnknownRegion {
                    continent: continent.clone(),
                    region: region.clone(),
                });
            }
        }

        if !regions.contains(&raw.default_region) {
            return Err(SnapshotError::UnknownDefaultRegion(raw.default_region));
        }
        for code in [&raw.default_continent_code, &raw.default_continent_code_backup] {
            if !raw.continents.contains_key(code) {
                return Err(SnapshotError::UnknownDefaultContinent(code.clone()));
            }
        }

        Ok(Self {
            regions,
            continents: raw.continents,
            defaults: RoutingDefaults {
                default_continent: raw.default_continent,
                default_continent_code: raw.default_continent_code,
                default_continent_code_backup: raw.default_continent_code_backup,
                default_region: raw.default_region,
            },
        })
    }

    /// Region serving `continent_code`, or the default region.
    pub fn resolve_region(&self, continent_code: &str) -> &str {
        self.continents
            .get(continent_code)
            .map(String::as_str)
            .unwrap_or(&self.defaults.default_region)
    }

    /// Exact membership test against the recognized continent set.
    pub fn is_recognized_continent(&self, code: &str) -> bool {
        self.continents.contains_key(code)
    }

    /// Deterministic region fallback chain for `continent_code`.
    ///
    /// Order: the continent's own region (default region if unknown), the
    /// default continent's region, the backup continent's region, the default
    /// region. Duplicates are dropped, keeping the first occurrence.
    pub fn region_chain(&self, continent_code: &str) -> Vec<&str> {
        let candidates = [
            self.resolve_region(continent_code),
            self.resolve_region(&self.defaults.default_continent_code),
            self.resolve_region(&self.defaults.default_continent_code_backup),
            self.defaults.default_region.as_str(),
        ];

        let mut chain = Vec::with_capacity(candidates.len());
        for region in candidates {
            if !chain.contains(&region) {
                chain.push(region);
            }
        }
        chain
    }

    pub fn default_continent_name(&self) -> &str {
        &self.defaults.default_continent
    }

    pub fn default_continent_code(&self) -> &str {
        &self.defaults.default_continent_code
    }

    pub fn default_continent_code_backup(&self) -> &str {
        &self.defaults.default_continent_code_backup
    }

    pub fn default_region(&self) -> &str {
        &self.defaults.default_region
    }

    pub fn defaults(&self) -> &RoutingDefaults {
        &self.defaults
    }

    /// Recognized continent codes, sorted.
    pub fn continent_codes(&self) -> impl Iterator<Item = &str> {
        self.continents.keys().map(String::as_str)
    }

    pub fn is_recognized_region(&self, region: &str) -> bool {
        self.regions.contains(region)
    }
}
