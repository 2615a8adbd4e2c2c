//! # Kodi Provider
//!
//! Implements the `MediaSource` trait for the Kodi JSON-RPC video library.
//!
//! ## Overview
//!
//! This module provides:
//! - Movie and episode listing with watch state (`VideoLibrary.GetMovies`,
//!   `VideoLibrary.GetEpisodes`)
//! - Partial watch-state updates (`VideoLibrary.SetMovieDetails`,
//!   `VideoLibrary.SetEpisodeDetails`)
//! - A `HEAD` liveness check against the JSON-RPC endpoint
//! - Tolerant decoding of the loosely typed Kodi payloads

pub mod connector;
pub mod error;
pub mod types;

pub use connector::KodiConnector;
pub use error::{KodiError, Result};
