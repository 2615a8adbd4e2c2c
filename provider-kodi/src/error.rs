//! Error types for the Kodi provider

use core_library::error::LibraryError;
use thiserror::Error;

/// Kodi provider errors
#[derive(Error, Debug)]
pub enum KodiError {
    /// Endpoint answered with a non-success HTTP status
    #[error("Kodi HTTP error (status {status_code}): {message}")]
    HttpStatus { status_code: u16, message: String },

    /// JSON-RPC `error` member in the response
    #[error("Kodi JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Response carried neither a result nor an error
    #[error("Kodi returned no result for {0}")]
    EmptyResult(String),

    /// Update acknowledged with something other than "OK"
    #[error("Kodi rejected the update: {0}")]
    Rejected(String),

    /// Failed to parse API response
    #[error("Failed to parse Kodi response: {0}")]
    ParseError(String),

    /// Transport failure
    #[error(transparent)]
    BridgeError(#[from] bridge_traits::error::BridgeError),
}

/// Result type for Kodi operations
pub type Result<T> = std::result::Result<T, KodiError>;

impl KodiError {
    /// Transport level failure (the library could not be talked to)
    pub fn is_transport(&self) -> bool {
        matches!(self, KodiError::BridgeError(_) | KodiError::HttpStatus { .. })
    }

    /// Map a fetch failure onto the library error taxonomy
    pub fn into_fetch_error(self, library: &str) -> LibraryError {
        let reason = self.to_string();
        if self.is_transport() {
            LibraryError::Unreachable {
                library: library.to_string(),
                reason,
            }
        } else {
            LibraryError::NoData {
                library: library.to_string(),
                reason,
            }
        }
    }

    /// Map an update failure onto the library error taxonomy
    pub fn into_update_error(self, library: &str, kind: &str, id: u64) -> LibraryError {
        let reason = self.to_string();
        if self.is_transport() {
            LibraryError::Unreachable {
                library: library.to_string(),
                reason,
            }
        } else {
            LibraryError::UpdateRejected {
                library: library.to_string(),
                kind: kind.to_string(),
                id,
                reason,
            }
        }
    }
}
