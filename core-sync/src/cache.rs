//! # Snapshot Cache
//!
//! Keeps the last successfully fetched state of each library on disk so a
//! library that is unreachable on a later run can still serve as a
//! reconciliation reference.
//!
//! One pretty-printed JSON file per library lives in the application data
//! directory. The file name is derived from the library address, e.g.
//! `192.168.1.10` is stored as `192_168_1_10.json`.

use crate::error::{Result, SyncError};
use bridge_traits::storage::FileSystemAccess;
use bytes::Bytes;
use core_library::snapshot::LibrarySnapshot;
use core_runtime::config::storage_key;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

pub struct SnapshotCache {
    fs: Arc<dyn FileSystemAccess>,
    lock: Mutex<()>,
}

impl SnapshotCache {
    pub fn new(fs: Arc<dyn FileSystemAccess>) -> Self {
        Self {
            fs,
            lock: Mutex::new(()),
        }
    }

    /// Cache file name for a library address
    pub fn file_name(address: &str) -> String {
        format!("{}.json", storage_key(address))
    }

    async fn path_for(&self, address: &str) -> Result<PathBuf> {
        let dir = self.fs.get_data_directory().await?;
        Ok(dir.join(Self::file_name(address)))
    }

    /// Replace the cached snapshot of a library.
    #[instrument(skip(self, snapshot))]
    pub async fn save(&self, address: &str, snapshot: &LibrarySnapshot) -> Result<PathBuf> {
        let path = self.path_for(address).await?;
        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| SyncError::persistence(path.display().to_string(), e))?;

        let _guard = self.lock.lock().await;
        self.fs
            .write_file(&path, Bytes::from(json))
            .await
            .map_err(|e| SyncError::persistence(path.display().to_string(), e))?;

        info!(
            path = %path.display(),
            movies = snapshot.movies.count(),
            episodes = snapshot.episodes.count(),
            "Saved library snapshot"
        );
        Ok(path)
    }

    /// Load the cached snapshot of a library.
    ///
    /// A missing or unreadable cache yields an empty snapshot without results.
    #[instrument(skip(self))]
    pub async fn load(&self, address: &str) -> LibrarySnapshot {
        let path = match self.path_for(address).await {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "Data directory unavailable");
                return LibrarySnapshot::empty();
            }
        };

        let _guard = self.lock.lock().await;

        match self.fs.exists(&path).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(path = %path.display(), "No cached snapshot");
                return LibrarySnapshot::empty();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not check cached snapshot");
                return LibrarySnapshot::empty();
            }
        }

        let data = match self.fs.read_file(&path).await {
            Ok(data) => data,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read cached snapshot");
                return LibrarySnapshot::empty();
            }
        };

        match serde_json::from_slice::<LibrarySnapshot>(&data) {
            Ok(snapshot) => {
                info!(
                    path = %path.display(),
                    movies = snapshot.movies.count(),
                    episodes = snapshot.episodes.count(),
                    "Loaded cached snapshot"
                );
                snapshot
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cached snapshot is corrupt, ignoring");
                LibrarySnapshot::empty()
            }
        }
    }
}
