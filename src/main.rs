//! `watch-sync` binary
//!
//! Runs one watch-state sync between the two configured Kodi libraries.
//!
//! Configuration is read from the JSON file given as the first argument, or
//! from `WATCH_SYNC_*` environment variables when no argument is given.

use anyhow::Context;
use core_runtime::logging::init_logging;
use core_runtime::SyncConfig;
use std::time::Duration;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => SyncConfig::from_file(&path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => SyncConfig::from_env().context("Failed to load configuration from environment")?,
    };

    init_logging(config.logging()).context("Failed to initialize logging")?;

    let shutdown_delay = config.shutdown_delay_secs;
    let service =
        core_service::bootstrap_desktop(config).context("Failed to start sync service")?;

    match service.data_directory().await {
        Ok(dir) => info!(path = %dir.display(), "Using data directory"),
        Err(e) => warn!(error = %e, "Data directory unavailable, nothing will be cached"),
    }

    let report = service.run().await;
    info!(
        primary = %report.primary.state,
        secondary = %report.secondary.state,
        updates = report.updates_attempted(),
        failed = report.updates_failed(),
        "Sync complete"
    );

    for remaining in (1..=shutdown_delay).rev() {
        debug!("Closing in {}s", remaining);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    Ok(())
}
