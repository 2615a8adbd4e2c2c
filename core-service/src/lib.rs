//! Sync service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, host probe,
//! filesystem, clock) and a validated [`SyncConfig`] into one
//! [`SyncCoordinator`] run. Desktop builds enable the `desktop-shims`
//! feature (which depends on `bridge-desktop`) and call
//! [`bootstrap_desktop`]; tests and other hosts assemble
//! [`SyncDependencies`] by hand.

pub mod error;

pub use error::{Result, ServiceError};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{
    http::HttpClient, network::HostProbe, storage::FileSystemAccess, time::Clock,
};
use core_runtime::config::{LibraryEndpoint, SyncConfig};
use core_sync::{ChangeLog, Lane, SnapshotCache, SyncCoordinator, SyncReport};
use provider_kodi::KodiConnector;
use tracing::info;

/// Aggregated handle to all bridge dependencies a sync run requires.
pub struct SyncDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub probe: Arc<dyn HostProbe>,
    pub filesystem: Arc<dyn FileSystemAccess>,
    pub clock: Arc<dyn Clock>,
}

impl SyncDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        probe: Arc<dyn HostProbe>,
        filesystem: Arc<dyn FileSystemAccess>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http_client,
            probe,
            filesystem,
            clock,
        }
    }
}

/// Primary façade exposed to the binary.
#[derive(Clone)]
pub struct SyncService {
    config: Arc<SyncConfig>,
    deps: Arc<SyncDependencies>,
}

impl SyncService {
    /// Create a new service, validating the configuration first.
    pub fn new(config: SyncConfig, deps: SyncDependencies) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            deps: Arc::new(deps),
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Directory holding snapshot caches and change logs, created on demand
    pub async fn data_directory(&self) -> Result<PathBuf> {
        Ok(self.deps.filesystem.get_data_directory().await?)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs)
    }

    /// Build a coordinator for both configured libraries.
    pub fn coordinator(&self) -> SyncCoordinator {
        let lane = |endpoint: &LibraryEndpoint| {
            let connector = KodiConnector::from_endpoint(endpoint, Arc::clone(&self.deps.http_client))
                .with_timeout(self.request_timeout());
            Lane::from_endpoint(endpoint, Arc::new(connector))
        };

        SyncCoordinator::new(
            lane(&self.config.primary),
            lane(&self.config.secondary),
            Arc::clone(&self.deps.probe),
            SnapshotCache::new(Arc::clone(&self.deps.filesystem)),
            ChangeLog::new(Arc::clone(&self.deps.filesystem), Arc::clone(&self.deps.clock)),
        )
    }

    /// Run one sync between the two configured libraries.
    pub async fn run(&self) -> SyncReport {
        info!(
            primary = %self.config.primary.name,
            secondary = %self.config.secondary.name,
            "Syncing watch state"
        );
        self.coordinator().run().await
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// Uses `reqwest` for HTTP, a TCP connect probe, the platform data directory
/// (or `config.data_dir` when set) and the system clock. The request timeout
/// applies to both the probe and every library call.
///
/// ```no_run
/// # async fn example(config: core_runtime::SyncConfig) -> core_service::Result<()> {
/// let service = core_service::bootstrap_desktop(config)?;
/// let report = service.run().await;
/// println!("{} updates", report.updates_attempted());
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(config: SyncConfig) -> Result<SyncService> {
    use bridge_desktop::{ReqwestHttpClient, TcpHostProbe, TokioFileSystem};
    use bridge_traits::time::SystemClock;

    let timeout = Duration::from_secs(config.request_timeout_secs);
    let filesystem = match &config.data_dir {
        Some(dir) => TokioFileSystem::with_data_directory(dir.clone()),
        None => TokioFileSystem::new(),
    };

    let deps = SyncDependencies::new(
        Arc::new(ReqwestHttpClient::with_timeout(timeout)),
        Arc::new(TcpHostProbe::with_timeout(timeout)),
        Arc::new(filesystem),
        Arc::new(SystemClock),
    );
    SyncService::new(config, deps)
}
