//! # Sync Configuration Module
//!
//! Provides the static configuration for one batch run: the two library
//! endpoints, their credentials, timeouts, the shutdown delay and logging
//! preferences.
//!
//! ## Overview
//!
//! The configuration can be assembled three ways, all of which end in the
//! same [`SyncConfig::validate`] call:
//! - [`SyncConfig::builder`] for programmatic construction
//! - [`SyncConfig::from_file`] for a JSON settings file
//! - [`SyncConfig::from_env`] for `WATCH_SYNC_*` environment variables
//!
//! ## JSON layout
//!
//! ```json
//! {
//!   "primary":   { "name": "Living room", "address": "192.168.1.10",
//!                  "api_url": "http://192.168.1.10:8080/jsonrpc",
//!                  "username": "kodi", "password": "kodi" },
//!   "secondary": { "name": "Bedroom", "address": "192.168.1.11",
//!                  "api_url": "http://192.168.1.11:8080/jsonrpc" },
//!   "shutdown_delay_secs": 5
//! }
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{LibraryEndpoint, SyncConfig};
//!
//! let config = SyncConfig::builder()
//!     .primary(LibraryEndpoint::new("Living room", "192.168.1.10", "http://192.168.1.10:8080/jsonrpc"))
//!     .secondary(LibraryEndpoint::new("Bedroom", "192.168.1.11", "http://192.168.1.11:8080/jsonrpc"))
//!     .shutdown_delay_secs(10)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::logging::{redact_if_sensitive, LogFormat, LoggingConfig};
use bridge_traits::time::LogLevel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use url::Url;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// File-name stem under which a library's local state is stored.
///
/// Every character outside `[A-Za-z0-9]` becomes `_`, so `192.168.1.10`
/// maps to `192_168_1_10`. Distinct addresses can share a stem
/// (`kodi-den` and `kodi.den`), which [`SyncConfig::validate`] rejects.
pub fn storage_key(address: &str) -> String {
    address
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Connection details for one media library
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEndpoint {
    /// Display name used in logs and change-log entries
    pub name: String,

    /// Network address of the host; also keys the snapshot cache file
    pub address: String,

    /// JSON-RPC endpoint of the library service
    pub api_url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

impl LibraryEndpoint {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            api_url: api_url.into(),
            username: String::new(),
            password: String::new(),
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Address handed to the host probe.
    ///
    /// The bare host address carries no port, so the API URL's port (or its
    /// scheme default) is appended to probe the port the service listens on.
    /// IPv6 literals are bracketed (`[::1]:8080`).
    pub fn probe_address(&self) -> String {
        let Some(port) = Url::parse(&self.api_url)
            .ok()
            .and_then(|url| url.port_or_known_default())
        else {
            return self.address.clone();
        };

        let host = self.address.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = host.parse::<IpAddr>() {
            return SocketAddr::new(ip, port).to_string();
        }

        if self.address.contains(':') {
            self.address.clone()
        } else {
            format!("{}:{}", self.address, port)
        }
    }

    /// File-name stem of this library's cached state
    pub fn storage_key(&self) -> String {
        storage_key(&self.address)
    }

    fn validate(&self, role: &str) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config(format!("{} library name cannot be empty", role)));
        }
        if self.address.trim().is_empty() {
            return Err(Error::Config(format!(
                "{} library address cannot be empty",
                role
            )));
        }
        let url = Url::parse(&self.api_url).map_err(|e| {
            Error::Config(format!(
                "{} library API URL '{}' is invalid: {}",
                role, self.api_url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "{} library API URL must use http or https",
                role
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for LibraryEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryEndpoint")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("api_url", &self.api_url)
            .field("username", &self.username)
            .field("password", &redact_if_sensitive("password", &self.password))
            .finish()
    }
}

/// Configuration for one sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// First library (lane X)
    pub primary: LibraryEndpoint,

    /// Second library (lane Y)
    pub secondary: LibraryEndpoint,

    /// Seconds to wait after the run before the process exits
    #[serde(default)]
    pub shutdown_delay_secs: u64,

    /// Timeout applied to every probe and remote call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Overrides the platform data directory for cache and log files
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

impl SyncConfig {
    /// Creates a new builder for constructing a `SyncConfig`.
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Load and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| Error::ConfigFile {
            path: path.display().to_string(),
            source,
        })?;
        let config: SyncConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Build the configuration from `WATCH_SYNC_*` environment variables.
    ///
    /// | Variable | Meaning |
    /// |----------|---------|
    /// | `WATCH_SYNC_SERVER1_NAME` / `_ADDRESS` / `_API_URL` / `_USERNAME` / `_PASSWORD` | lane X |
    /// | `WATCH_SYNC_SERVER2_NAME` / `_ADDRESS` / `_API_URL` / `_USERNAME` / `_PASSWORD` | lane Y |
    /// | `WATCH_SYNC_SHUTDOWN_DELAY_SECS` | shutdown delay |
    /// | `WATCH_SYNC_REQUEST_TIMEOUT_SECS` | network timeout |
    /// | `WATCH_SYNC_DATA_DIR` | cache and log directory |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = |index: u8| -> Result<LibraryEndpoint> {
            let var = |field: &str| lookup(&format!("WATCH_SYNC_SERVER{}_{}", index, field));
            let address = var("ADDRESS").ok_or_else(|| {
                Error::Config(format!("WATCH_SYNC_SERVER{}_ADDRESS is not set", index))
            })?;
            let api_url = var("API_URL").ok_or_else(|| {
                Error::Config(format!("WATCH_SYNC_SERVER{}_API_URL is not set", index))
            })?;
            let name = var("NAME").unwrap_or_else(|| address.clone());

            Ok(LibraryEndpoint::new(name, address, api_url).with_credentials(
                var("USERNAME").unwrap_or_default(),
                var("PASSWORD").unwrap_or_default(),
            ))
        };

        let parse_secs = |key: &str| -> Result<Option<u64>> {
            lookup(key)
                .map(|value| {
                    value
                        .trim()
                        .parse::<u64>()
                        .map_err(|e| Error::Config(format!("{} must be a number: {}", key, e)))
                })
                .transpose()
        };

        let mut builder = SyncConfig::builder()
            .primary(endpoint(1)?)
            .secondary(endpoint(2)?);

        if let Some(delay) = parse_secs("WATCH_SYNC_SHUTDOWN_DELAY_SECS")? {
            builder = builder.shutdown_delay_secs(delay);
        }
        if let Some(timeout) = parse_secs("WATCH_SYNC_REQUEST_TIMEOUT_SECS")? {
            builder = builder.request_timeout_secs(timeout);
        }
        if let Some(dir) = lookup("WATCH_SYNC_DATA_DIR") {
            builder = builder.data_dir(dir);
        }

        builder.build()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Both endpoints have a name, an address and a parseable http(s) API URL
    /// - The two addresses map to different cache files
    /// - The request timeout is > 0 and at most 5 minutes
    pub fn validate(&self) -> Result<()> {
        self.primary.validate("Primary")?;
        self.secondary.validate("Secondary")?;

        let key = self.primary.storage_key();
        if key.eq_ignore_ascii_case(&self.secondary.storage_key()) {
            return Err(Error::Config(format!(
                "Primary and secondary library addresses both map to cache file {}.json",
                key
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "Request timeout must be greater than 0 seconds".to_string(),
            ));
        }

        if self.request_timeout_secs > 300 {
            return Err(Error::Config(
                "Request timeout exceeds maximum of 300 seconds".to_string(),
            ));
        }

        Ok(())
    }

    /// Logging settings derived from this configuration.
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig::default()
            .with_format(self.log_format)
            .with_level(self.log_level)
    }
}

/// Builder for constructing [`SyncConfig`] instances.
#[derive(Debug, Default)]
pub struct SyncConfigBuilder {
    primary: Option<LibraryEndpoint>,
    secondary: Option<LibraryEndpoint>,
    shutdown_delay_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    data_dir: Option<PathBuf>,
    log_level: Option<LogLevel>,
    log_format: Option<LogFormat>,
}

impl SyncConfigBuilder {
    pub fn primary(mut self, endpoint: LibraryEndpoint) -> Self {
        self.primary = Some(endpoint);
        self
    }

    pub fn secondary(mut self, endpoint: LibraryEndpoint) -> Self {
        self.secondary = Some(endpoint);
        self
    }

    /// Default: 0 (exit immediately)
    pub fn shutdown_delay_secs(mut self, secs: u64) -> Self {
        self.shutdown_delay_secs = Some(secs);
        self
    }

    /// Default: 5 seconds
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    pub fn data_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.log_format = Some(format);
        self
    }

    /// Builds the final [`SyncConfig`], validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if either endpoint is missing or validation fails.
    pub fn build(self) -> Result<SyncConfig> {
        let primary = self
            .primary
            .ok_or_else(|| Error::Config("Primary library is required".to_string()))?;
        let secondary = self
            .secondary
            .ok_or_else(|| Error::Config("Secondary library is required".to_string()))?;

        let config = SyncConfig {
            primary,
            secondary,
            shutdown_delay_secs: self.shutdown_delay_secs.unwrap_or(0),
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            data_dir: self.data_dir,
            log_level: self.log_level.unwrap_or(LogLevel::Info),
            log_format: self.log_format.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
