//! Content gateway model.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use shared::crypto::IntegrityHash;

use crate::error::SnapshotError;

/// Placeholder in a gateway URL that is replaced by the content id.
pub const CONTENT_ID_PLACEHOLDER: &str = ":hash";

/// Uptime fixture as it appears in the catalog file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawFixture {
    pub integrity_hash: String,
    pub content_id: String,
}

/// Gateway record as it appears in the catalog file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawGateway {
    pub id: String,
    pub continent_code: String,
    pub url: String,
    pub fixture: String,
}

/// Reference document used to check that a gateway serves correct content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UptimeFixture {
    pub name: String,
    pub integrity: IntegrityHash,
    pub content_id: String,
}

/// A content gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRecord {
    pub id: String,
    pub continent_code: String,
    pub url: String,
    pub fixture: UptimeFixture,
}

impl GatewayRecord {
    /// URL that serves the fixture's reference content on this gateway.
    pub fn probe_url(&self) -> String {
        if self.url.contains(CONTENT_ID_PLACEHOLDER) {
            self.url
                .replace(CONTENT_ID_PLACEHOLDER, &self.fixture.content_id)
        } else {
            format!(
                "{}/{}",
                self.url.trim_end_matches('/'),
                self.fixture.content_id
            )
        }
    }
}

/// Outcome of the most recent probe of a gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct UptimeResult {
    pub ok: bool,
    /// Epoch milliseconds at which the probe completed.
    pub timestamp_ms: i64,
}

impl UptimeResult {
    /// Fresh while `now - timestamp <= ttl`.
    pub fn is_fresh(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms.saturating_sub(self.timestamp_ms) <= ttl_ms
    }
}

/// Ordered gateway table with its fixtures resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayTable {
    gateways: Vec<GatewayRecord>,
    index: HashMap<String, usize>,
}

impl GatewayTable {
    /// Validates the raw tables. `is_continent` decides which continent codes
    /// are recognized.
    pub fn from_raw(
        fixtures: BTreeMap<String, RawFixture>,
        gateways: Vec<RawGateway>,
        is_continent: impl Fn(&str) -> bool,
    ) -> Result<Self, SnapshotError> {
        let mut parsed = HashMap::with_capacity(fixtures.len());
        for (name, raw) in fixtures {
            let integrity = IntegrityHash::parse(&raw.integrity_hash).map_err(|e| {
                SnapshotError::InvalidIntegrityHash {
                    fixture: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            parsed.insert(
                name.clone(),
                UptimeFixture {
                    name,
                    integrity,
                    content_id: raw.content_id,
                },
            );
        }

        let mut table = Self::default();
        for raw in gateways {
            if table.index.contains_key(&raw.id) {
                return Err(SnapshotError::DuplicateGateway(raw.id));
            }
            if !is_continent(&raw.continent_code) {
                return Err(SnapshotError::UnknownGatewayContinent {
                    gateway: raw.id,
                    continent: raw.continent_code,
                });
            }
            let fixture = parsed.get(&raw.fixture).cloned().ok_or_else(|| {
                SnapshotError::UnknownFixture {
                    gateway: raw.id.clone(),
                    fixture: raw.fixture.clone(),
                }
            })?;

            table.index.insert(raw.id.clone(), table.gateways.len());
            table.gateways.push(GatewayRecord {
                id: raw.id,
                continent_code: raw.continent_code,
                url: raw.url,
                fixture,
            });
        }

        Ok(table)
    }

    pub fn get(&self, id: &str) -> Option<&GatewayRecord> {
        self.index.get(id).map(|&i| &self.gateways[i])
    }

    /// Gateways in table order.
    pub fn iter(&self) -> impl Iterator<Item = &GatewayRecord> {
        self.gateways.iter()
    }

    /// Gateways of one continent, in table order.
    pub fn in_continent<'a>(
        &'a self,
        continent_code: &'a str,
    ) -> impl Iterator<Item = &'a GatewayRecord> + 'a {
        self.gateways
            .iter()
            .filter(move |g| g.continent_code == continent_code)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.gateways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gateways.is_empty()
    }
}
