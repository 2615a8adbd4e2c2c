//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `HostProbe` using a bounded TCP connect
//! - `FileSystemAccess` using `tokio::fs` rooted at the platform data directory
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, TcpHostProbe, TokioFileSystem};
//! use std::time::Duration;
//!
//! let http_client = ReqwestHttpClient::with_timeout(Duration::from_secs(5));
//! let probe = TcpHostProbe::with_timeout(Duration::from_secs(5));
//! let fs = TokioFileSystem::new();
//! ```

mod filesystem;
mod http;
mod network;

pub use filesystem::TokioFileSystem;
pub use http::ReqwestHttpClient;
pub use network::TcpHostProbe;
