//! Catalog file loading and hot reload.

use std::path::{Path, PathBuf};

use domain::error::SnapshotError;
use domain::services::GatewayUptimeTracker;
use domain::snapshot::{ConfigSnapshot, SnapshotHandle};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog {path} is invalid: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: SnapshotError,
    },
}

/// Reads and validates the catalog at `path`.
pub async fn load_catalog(path: impl AsRef<Path>) -> Result<ConfigSnapshot, CatalogLoadError> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CatalogLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    ConfigSnapshot::from_json(&json).map_err(|source| CatalogLoadError::Invalid {
        path: path.to_path_buf(),
        source,
    })
}

/// Re-reads the catalog and installs it if valid.
///
/// On failure the active snapshot and gateway table stay in place.
pub async fn reload_catalog(
    path: impl AsRef<Path>,
    snapshot: &SnapshotHandle,
    tracker: &GatewayUptimeTracker,
) -> Result<(), CatalogLoadError> {
    match load_catalog(path).await {
        Ok(next) => {
            let gateways = next.gateways();
            let previous = snapshot.replace(next);
            tracker.replace_gateways(gateways);
            info!(previous_version = %previous.version(), "Catalog reloaded");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Catalog reload rejected, keeping previous snapshot");
            Err(e)
        }
    }
}
