//! # Library Model Module
//!
//! Owns the media catalog model shared by the providers and the sync engine.
//!
//! ## Overview
//!
//! This module provides:
//! - Movie and episode models with their watch state
//! - Snapshots of one library with on-demand aggregate counts
//! - Matching rules that pair items across two libraries
//! - The `MediaSource` contract implemented by library providers

pub mod error;
pub mod matcher;
pub mod models;
pub mod snapshot;
pub mod source;

pub use error::{LibraryError, Result};
pub use matcher::{EpisodeRules, MatchRules, MovieRules};
pub use models::{Episode, MediaItem, MediaKind, Movie, ResumeState, WatchState, WatchUpdate};
pub use snapshot::{LibrarySnapshot, Snapshot};
pub use source::MediaSource;
