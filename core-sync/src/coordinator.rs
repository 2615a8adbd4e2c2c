//! # Sync Coordinator
//!
//! Drives one end-to-end sync run between two libraries.
//!
//! ## Overview
//!
//! Each library is processed as a *lane*:
//! 1. Probe the host with `HostProbe`; an unreachable host makes the lane offline
//! 2. Check the service is alive and fetch movies and episodes; on success the
//!    lane is online and its snapshot is written to the `SnapshotCache`
//! 3. An offline lane falls back to its cached snapshot (historic load)
//! 4. An online lane whose snapshot and the other lane's snapshot both have
//!    results is reconciled against the other lane's pre-reconciliation state
//! 5. Every outdated item is pushed back through its `MediaSource`, with one
//!    change-log entry per attempt
//! 6. All entries are appended to the `ChangeLog`
//!
//! Fetching runs concurrently for both lanes; reconciliation, updates and
//! logging run afterwards in lane order so the output is deterministic.
//! Nothing here is fatal: failures are logged and reflected in the
//! [`SyncReport`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::{ChangeLog, Lane, SnapshotCache, SyncCoordinator};
//!
//! let coordinator = SyncCoordinator::new(
//!     Lane::from_endpoint(&config.primary, living_room),
//!     Lane::from_endpoint(&config.secondary, bedroom),
//!     probe,
//!     SnapshotCache::new(fs.clone()),
//!     ChangeLog::new(fs, clock),
//! );
//! let report = coordinator.run().await;
//! println!("{} updates pushed", report.updates_attempted());
//! ```

use crate::{
    cache::SnapshotCache,
    change_log::{ChangeLog, ChangeLogEntry},
    reconciler::{reconcile, Reconciliation},
    Result, SyncError,
};
use bridge_traits::network::HostProbe;
use core_library::matcher::{EpisodeRules, MovieRules};
use core_library::models::MediaItem;
use core_library::snapshot::{LibrarySnapshot, Snapshot};
use core_library::source::MediaSource;
use core_runtime::config::LibraryEndpoint;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// One library taking part in the sync
pub struct Lane {
    source: Arc<dyn MediaSource>,

    /// Key of the cached snapshot
    address: String,

    /// Address handed to the host probe
    probe_address: String,
}

impl Lane {
    pub fn new(source: Arc<dyn MediaSource>, address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            source,
            probe_address: address.clone(),
            address,
        }
    }

    pub fn from_endpoint(endpoint: &LibraryEndpoint, source: Arc<dyn MediaSource>) -> Self {
        Self::new(source, &endpoint.address).with_probe_address(endpoint.probe_address())
    }

    pub fn with_probe_address(mut self, probe_address: impl Into<String>) -> Self {
        self.probe_address = probe_address.into();
        self
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

/// How a lane obtained its snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneState {
    /// Fetched from the live library
    Online,
    /// Unreachable, snapshot restored from the cache
    HistoricLoad,
    /// Unreachable and no usable cache
    Offline,
}

impl fmt::Display for LaneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneState::Online => write!(f, "online"),
            LaneState::HistoricLoad => write!(f, "historic load"),
            LaneState::Offline => write!(f, "offline"),
        }
    }
}

/// Per-lane outcome of a run
#[derive(Debug, Clone, Serialize)]
pub struct LaneReport {
    pub name: String,
    pub state: LaneState,
    pub movies: usize,
    pub episodes: usize,
    /// Whether this lane was reconciled against the other one
    pub reconciled: bool,
    pub watched_mismatches: usize,
    pub resume_mismatches: usize,
    pub ambiguous: usize,
    pub updates_attempted: usize,
    pub updates_failed: usize,
}

impl LaneReport {
    fn new(name: &str, state: LaneState, snapshot: &LibrarySnapshot) -> Self {
        Self {
            name: name.to_string(),
            state,
            movies: snapshot.movies.count(),
            episodes: snapshot.episodes.count(),
            reconciled: false,
            watched_mismatches: 0,
            resume_mismatches: 0,
            ambiguous: 0,
            updates_attempted: 0,
            updates_failed: 0,
        }
    }

    fn record<T>(&mut self, outcome: &Reconciliation<T>) {
        self.watched_mismatches += outcome.watched_mismatches;
        self.resume_mismatches += outcome.resume_mismatches;
        self.ambiguous += outcome.ambiguous;
    }
}

/// Outcome of a full run
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub primary: LaneReport,
    pub secondary: LaneReport,
    pub log_entries_written: usize,
    pub persistence_failures: usize,
}

impl SyncReport {
    pub fn updates_attempted(&self) -> usize {
        self.primary.updates_attempted + self.secondary.updates_attempted
    }

    pub fn updates_failed(&self) -> usize {
        self.primary.updates_failed + self.secondary.updates_failed
    }
}

/// Lane snapshot after fetch or fallback
struct LaneOutcome {
    state: LaneState,
    snapshot: LibrarySnapshot,
    persistence_failed: bool,
}

/// Sync coordinator for one run between two libraries
pub struct SyncCoordinator {
    primary: Lane,
    secondary: Lane,
    probe: Arc<dyn HostProbe>,
    cache: SnapshotCache,
    change_log: ChangeLog,
}

impl SyncCoordinator {
    pub fn new(
        primary: Lane,
        secondary: Lane,
        probe: Arc<dyn HostProbe>,
        cache: SnapshotCache,
        change_log: ChangeLog,
    ) -> Self {
        Self {
            primary,
            secondary,
            probe,
            cache,
            change_log,
        }
    }

    /// Execute one sync run
    #[instrument(skip(self), fields(primary = %self.primary.name(), secondary = %self.secondary.name()))]
    pub async fn run(&self) -> SyncReport {
        info!("Starting watch-state sync");

        let (mut x, mut y) = futures::join!(
            self.load_lane(&self.primary),
            self.load_lane(&self.secondary)
        );

        // Each side is compared with what the other side looked like before
        // any merging happened
        let x_reference = x.snapshot.clone();
        let y_reference = y.snapshot.clone();

        let mut entries = Vec::new();
        let primary = self
            .sync_lane(&self.primary, &mut x, &y_reference, &mut entries)
            .await;
        let secondary = self
            .sync_lane(&self.secondary, &mut y, &x_reference, &mut entries)
            .await;

        let mut persistence_failures =
            usize::from(x.persistence_failed) + usize::from(y.persistence_failed);

        let log_entries_written = match self.change_log.append(&entries).await {
            Ok(written) => written,
            Err(e) => {
                warn!(error = %e, "Could not write change log");
                persistence_failures += 1;
                0
            }
        };

        let report = SyncReport {
            primary,
            secondary,
            log_entries_written,
            persistence_failures,
        };

        info!(
            updates = report.updates_attempted(),
            failed = report.updates_failed(),
            log_entries = report.log_entries_written,
            "Watch-state sync finished"
        );
        report
    }

    /// Fetch a lane, falling back to its cached snapshot
    async fn load_lane(&self, lane: &Lane) -> LaneOutcome {
        match self.fetch_lane(lane).await {
            Ok(snapshot) => {
                log_counts(lane.name(), "Fetched", &snapshot);
                let persistence_failed = match self.cache.save(lane.address(), &snapshot).await {
                    Ok(_) => false,
                    Err(e) => {
                        warn!(library = %lane.name(), error = %e, "Could not cache snapshot");
                        true
                    }
                };
                LaneOutcome {
                    state: LaneState::Online,
                    snapshot,
                    persistence_failed,
                }
            }
            Err(e) => {
                warn!(library = %lane.name(), error = %e, "Library offline, loading last known state");
                let snapshot = self.cache.load(lane.address()).await;
                let state = if snapshot.has_results() {
                    log_counts(lane.name(), "Restored", &snapshot);
                    LaneState::HistoricLoad
                } else {
                    info!(library = %lane.name(), "No previous state available");
                    LaneState::Offline
                };
                LaneOutcome {
                    state,
                    snapshot,
                    persistence_failed: false,
                }
            }
        }
    }

    #[instrument(skip(self, lane), fields(library = %lane.name()))]
    async fn fetch_lane(&self, lane: &Lane) -> Result<LibrarySnapshot> {
        if !self.probe.is_reachable(&lane.probe_address).await {
            return Err(SyncError::Unreachable {
                library: lane.name().to_string(),
                reason: format!("host {} did not answer", lane.probe_address),
            });
        }

        if !lane.source.check_alive().await {
            return Err(SyncError::Unreachable {
                library: lane.name().to_string(),
                reason: "library service is not responding".to_string(),
            });
        }

        let movies = lane.source.fetch_movies().await?;
        let episodes = lane.source.fetch_episodes().await?;

        Ok(LibrarySnapshot::new(
            Snapshot::loaded(movies),
            Snapshot::loaded(episodes),
        ))
    }

    /// Reconcile one lane against the other and push its updates
    async fn sync_lane(
        &self,
        lane: &Lane,
        outcome: &mut LaneOutcome,
        other: &LibrarySnapshot,
        entries: &mut Vec<ChangeLogEntry>,
    ) -> LaneReport {
        let mut report = LaneReport::new(lane.name(), outcome.state, &outcome.snapshot);

        if outcome.state != LaneState::Online {
            debug!(library = %lane.name(), state = %outcome.state, "Lane not online, no updates");
            return report;
        }
        if !outcome.snapshot.has_results() || !other.has_results() {
            info!(library = %lane.name(), "Nothing to compare against, skipping reconciliation");
            return report;
        }

        let movies = reconcile(
            &mut outcome.snapshot.movies.items,
            &other.movies.items,
            &MovieRules,
        );
        let episodes = reconcile(
            &mut outcome.snapshot.episodes.items,
            &other.episodes.items,
            &EpisodeRules,
        );

        report.reconciled = true;
        report.record(&movies);
        report.record(&episodes);

        info!(
            library = %lane.name(),
            watched_mismatches = report.watched_mismatches,
            resume_mismatches = report.resume_mismatches,
            ambiguous = report.ambiguous,
            "Reconciled against counterpart library"
        );

        self.propagate(lane, &movies.outdated, &mut report, entries)
            .await;
        self.propagate(lane, &episodes.outdated, &mut report, entries)
            .await;

        report
    }

    async fn propagate<T: MediaItem>(
        &self,
        lane: &Lane,
        outdated: &[T],
        report: &mut LaneReport,
        entries: &mut Vec<ChangeLogEntry>,
    ) {
        for item in outdated {
            let Some(update) = item.watch_update() else {
                continue;
            };

            let name = item.display_name();
            let details = update.describe();
            report.updates_attempted += 1;

            match lane.source.push_update(&update).await {
                Ok(()) => {
                    info!(library = %lane.name(), item = %name, detail = %details.join(", "), "Updated");
                    entries.push(ChangeLogEntry::updated(
                        self.change_log.now(),
                        lane.name(),
                        &name,
                        &details,
                    ));
                }
                Err(e) => {
                    let error = SyncError::from(e);
                    warn!(library = %lane.name(), item = %name, error = %error, "Update failed");
                    report.updates_failed += 1;
                    entries.push(ChangeLogEntry::failed(
                        self.change_log.now(),
                        lane.name(),
                        &name,
                        &details,
                    ));
                }
            }
        }
    }
}

fn log_counts(library: &str, action: &str, snapshot: &LibrarySnapshot) {
    info!(
        library,
        movies = snapshot.movies.count(),
        watched = snapshot.movies.count_watched(),
        resumable = snapshot.movies.count_resumable(),
        "{} {} movie(s)",
        action,
        snapshot.movies.count()
    );
    info!(
        library,
        episodes = snapshot.episodes.count(),
        watched = snapshot.episodes.count_watched(),
        resumable = snapshot.episodes.count_resumable(),
        "{} {} episode(s)",
        action,
        snapshot.episodes.count()
    );
}
