//! # Core Runtime Module
//!
//! Provides the runtime infrastructure shared by the sync crates:
//! - Logging and tracing setup
//! - Run configuration (library endpoints, timeouts, shutdown delay)
//!
//! ## Overview
//!
//! Every other crate in the workspace logs through `tracing`; this crate owns
//! the subscriber installation and the configuration that drives it.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{LibraryEndpoint, SyncConfig, SyncConfigBuilder};
pub use error::{Error, Result};
