//! # Host Bridge Traits
//!
//! Platform abstraction traits for the I/O the sync core depends on but does
//! not implement itself.
//!
//! ## Overview
//!
//! This crate defines the contract between the core crates and the
//! platform-specific implementations in `bridge-desktop`. Each trait
//! represents one capability the reconciliation run needs from the outside
//! world.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Single-shot HTTP requests with Basic auth and timeouts
//! - [`HostProbe`](network::HostProbe) - Network-level reachability of library hosts
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Snapshot cache and change log files
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Implementations convert platform errors into it and keep enough context
//! (URL, path) in the message to make log lines actionable.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so the two library lanes can share
//! implementations across async tasks.

pub mod error;
pub mod http;
pub mod network;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use network::{HostProbe, NetworkStatus};
pub use storage::FileSystemAccess;
pub use time::{Clock, FixedClock, LogLevel, SystemClock};
