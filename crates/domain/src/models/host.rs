//! Allowed host policy.

use std::collections::HashSet;

use crate::error::SnapshotError;

/// Hostnames (optionally with a port) that browser requests may come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostPolicy {
    hosts: HashSet<String>,
}

impl HostPolicy {
    /// Builds the policy, rejecting blank entries and entries with a scheme
    /// or path.
    pub fn from_raw(hosts: Vec<String>) -> Result<Self, SnapshotError> {
        let mut set = HashSet::with_capacity(hosts.len());
        for host in hosts {
            let normalized = host.trim().to_ascii_lowercase();
            if normalized.is_empty() || normalized.contains('/') || normalized.contains(' ') {
                return Err(SnapshotError::InvalidHost(host));
            }
            set.insert(normalized);
        }
        Ok(Self { hosts: set })
    }

    /// Exact, case-insensitive match against `host` (`name` or `name:port`).
    pub fn is_allowed_host(&self, host: &str) -> bool {
        self.hosts.contains(&host.trim().to_ascii_lowercase())
    }

    /// Matches an `Origin` header value such as `https://cyph.app`.
    pub fn is_allowed_origin(&self, origin: &str) -> bool {
        let host = origin
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(origin);
        let host = host.trim_end_matches('/');
        !host.contains('/') && self.is_allowed_host(host)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
