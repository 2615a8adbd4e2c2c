//! Remote library service contract

use crate::error::Result;
use crate::models::{Episode, Movie, WatchUpdate};
use async_trait::async_trait;

/// A remote media library that can be queried and updated.
///
/// Implementations perform their own transport and decoding. Fetch errors are
/// collapsed to "no data" by the caller, so they only need to be descriptive.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Name used in logs and change-log entries
    fn name(&self) -> &str;

    /// Lightweight liveness check of the service endpoint
    async fn check_alive(&self) -> bool;

    /// All movies with their watch state
    async fn fetch_movies(&self) -> Result<Vec<Movie>>;

    /// All episodes with their watch state
    async fn fetch_episodes(&self) -> Result<Vec<Episode>>;

    /// Apply a partial update; `None` fields stay untouched remotely
    async fn push_update(&self, update: &WatchUpdate) -> Result<()>;
}
