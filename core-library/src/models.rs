//! Domain models for watch-state sync
//!
//! Movies and episodes are distinct types that share a [`WatchState`]. The
//! [`MediaItem`] trait exposes that shared state so the reconciler and the
//! orchestrator can treat both variants uniformly.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Watch State
// =============================================================================

/// Playback progress of one item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResumeState {
    /// Seconds played into the item
    pub position: u64,
    /// Full duration in seconds (informational only)
    pub total: u64,
}

impl ResumeState {
    pub fn new(position: u64, total: u64) -> Self {
        Self { position, total }
    }

    pub fn is_started(&self) -> bool {
        self.position > 0
    }
}

/// Watch-state fields common to every media variant.
///
/// The outdated flags are never persisted. They are `false` on every freshly
/// decoded item and are only raised by a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchState {
    pub label: String,

    #[serde(default)]
    pub resume: ResumeState,

    #[serde(rename = "playcount", default)]
    pub play_count: u32,

    #[serde(skip)]
    pub watched_outdated: bool,

    #[serde(skip)]
    pub resume_outdated: bool,
}

impl WatchState {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn is_watched(&self) -> bool {
        self.play_count > 0
    }

    pub fn is_resumable(&self) -> bool {
        self.resume.is_started()
    }

    pub fn is_outdated(&self) -> bool {
        self.watched_outdated || self.resume_outdated
    }

    /// Clear both outdated flags
    pub fn reset_flags(&mut self) {
        self.watched_outdated = false;
        self.resume_outdated = false;
    }

    /// True when play count and resume position are identical
    pub fn same_progress(&self, other: &WatchState) -> bool {
        self.play_count == other.play_count && self.resume.position == other.resume.position
    }
}

// =============================================================================
// Media Variants
// =============================================================================

/// Media variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Episode,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Episode => "episode",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A movie as reported by a library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "movieid")]
    pub library_id: u64,

    /// Cross-reference id (IMDB number)
    #[serde(rename = "imdbnumber", default)]
    pub external_number: String,

    #[serde(default)]
    pub year: String,

    #[serde(flatten)]
    pub state: WatchState,
}

impl Movie {
    pub fn new(library_id: u64, label: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            library_id,
            external_number: String::new(),
            year: year.into(),
            state: WatchState::new(label),
        }
    }

    pub fn with_external_number(mut self, external_number: impl Into<String>) -> Self {
        self.external_number = external_number.into();
        self
    }

    pub fn with_play_count(mut self, play_count: u32) -> Self {
        self.state.play_count = play_count;
        self
    }

    pub fn with_resume(mut self, position: u64, total: u64) -> Self {
        self.state.resume = ResumeState::new(position, total);
        self
    }
}

/// A TV episode as reported by a library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    #[serde(rename = "episodeid")]
    pub library_id: u64,

    #[serde(rename = "showtitle", default)]
    pub show_title: String,

    #[serde(flatten)]
    pub state: WatchState,
}

impl Episode {
    pub fn new(library_id: u64, show_title: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            library_id,
            show_title: show_title.into(),
            state: WatchState::new(label),
        }
    }

    pub fn with_play_count(mut self, play_count: u32) -> Self {
        self.state.play_count = play_count;
        self
    }

    pub fn with_resume(mut self, position: u64, total: u64) -> Self {
        self.state.resume = ResumeState::new(position, total);
        self
    }
}

/// Shared view over the media variants
pub trait MediaItem: Clone + Send + Sync {
    const KIND: MediaKind;

    fn state(&self) -> &WatchState;

    fn state_mut(&mut self) -> &mut WatchState;

    /// Identifier of the item inside its own library
    fn library_id(&self) -> u64;

    /// Human readable name for logs and change-log entries
    fn display_name(&self) -> String;

    fn label(&self) -> &str {
        &self.state().label
    }

    fn is_outdated(&self) -> bool {
        self.state().is_outdated()
    }

    /// Build the remote update for the fields this item has flagged.
    ///
    /// Returns `None` when nothing is outdated.
    fn watch_update(&self) -> Option<WatchUpdate> {
        let state = self.state();
        if !state.is_outdated() {
            return None;
        }
        Some(WatchUpdate {
            kind: Self::KIND,
            library_id: self.library_id(),
            play_count: state.watched_outdated.then_some(state.play_count),
            resume_position: state.resume_outdated.then_some(state.resume.position),
        })
    }
}

impl MediaItem for Movie {
    const KIND: MediaKind = MediaKind::Movie;

    fn state(&self) -> &WatchState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut WatchState {
        &mut self.state
    }

    fn library_id(&self) -> u64 {
        self.library_id
    }

    fn display_name(&self) -> String {
        if self.year.is_empty() {
            self.state.label.clone()
        } else {
            format!("{} {}", self.state.label, self.year)
        }
    }
}

impl MediaItem for Episode {
    const KIND: MediaKind = MediaKind::Episode;

    fn state(&self) -> &WatchState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut WatchState {
        &mut self.state
    }

    fn library_id(&self) -> u64 {
        self.library_id
    }

    fn display_name(&self) -> String {
        if self.show_title.is_empty() {
            self.state.label.clone()
        } else {
            format!("{} {}", self.show_title, self.state.label)
        }
    }
}

// =============================================================================
// Remote Updates
// =============================================================================

/// Partial watch-state update for one remote item.
///
/// `None` fields must be left untouched by the receiving library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchUpdate {
    pub kind: MediaKind,
    pub library_id: u64,
    pub play_count: Option<u32>,
    pub resume_position: Option<u64>,
}

impl WatchUpdate {
    pub fn is_empty(&self) -> bool {
        self.play_count.is_none() && self.resume_position.is_none()
    }

    /// Change-log detail lines ("Set to watched", "Set resume pos to N")
    pub fn describe(&self) -> Vec<String> {
        let mut details = Vec::new();
        if self.play_count.is_some() {
            details.push("Set to watched".to_string());
        }
        if let Some(position) = self.resume_position {
            details.push(format!("Set resume pos to {}", position));
        }
        details
    }
}
