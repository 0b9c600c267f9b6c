use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use domain::services::{GatewayUptimeTracker, SystemClock};
use domain::snapshot::SnapshotHandle;
use tracing::{info, warn};

use edge_config_api::{
    app, catalog,
    config::Config,
    jobs::{JobScheduler, UptimeRefreshJob},
    middleware::{self, metrics::record_catalog_reload, ProbeMetrics},
    services::HttpProbe,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    middleware::logging::init_logging(&config.logging)?;
    middleware::init_metrics().map_err(anyhow::Error::msg)?;

    info!("Starting edge-config v{}", env!("CARGO_PKG_VERSION"));

    // A missing or invalid catalog is fatal at startup.
    let snapshot = catalog::load_catalog(&config.catalog.path)
        .await
        .context("Failed to load catalog")?;
    let snapshot = Arc::new(SnapshotHandle::new(snapshot));

    let settings = config.uptime.settings();
    let probe = HttpProbe::new(settings.probe_timeout).context("Failed to build HTTP client")?;
    let tracker = GatewayUptimeTracker::new_observed(
        snapshot.load().gateways(),
        Arc::new(probe),
        Arc::new(SystemClock),
        Arc::new(ProbeMetrics),
        settings,
    );

    let mut scheduler = JobScheduler::new();
    if config.uptime.refresh_enabled {
        scheduler.register(UptimeRefreshJob::new(
            tracker.clone(),
            config.uptime.refresh_interval_secs,
        ));
    }
    scheduler.start();

    let reloader = spawn_reload_listener(
        config.catalog.path.clone(),
        Arc::clone(&snapshot),
        tracker.clone(),
    );

    let addr = config.socket_addr()?;
    let app = app::create_app(config, snapshot, tracker);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;
    if let Some(reloader) = reloader {
        reloader.abort();
    }

    info!("Server stopped");
    Ok(())
}

/// Re-reads the catalog on SIGHUP.
#[cfg(unix)]
fn spawn_reload_listener(
    path: String,
    snapshot: Arc<SnapshotHandle>,
    tracker: GatewayUptimeTracker,
) -> Option<tokio::task::JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangups = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, "Catalog hot reload disabled");
            return None;
        }
    };

    Some(tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            info!(path = %path, "SIGHUP received, reloading catalog");
            let result = catalog::reload_catalog(&path, &snapshot, &tracker).await;
            record_catalog_reload(result.is_ok());
        }
    }))
}

#[cfg(not(unix))]
fn spawn_reload_listener(
    _path: String,
    _snapshot: Arc<SnapshotHandle>,
    _tracker: GatewayUptimeTracker,
) -> Option<tokio::task::JoinHandle<()>> {
    None
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
