use bridge_traits::error::BridgeError;
use core_library::error::LibraryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Library {library} is unreachable: {reason}")]
    Unreachable { library: String, reason: String },

    #[error("Library {library} returned no data: {reason}")]
    NoData { library: String, reason: String },

    #[error("Failed to push update for {item} to {library}: {reason}")]
    UpdatePushFailed {
        library: String,
        item: String,
        reason: String,
    },

    #[error("Persistence failed for {path}: {reason}")]
    PersistenceFailed { path: String, reason: String },

    #[error("Library error: {0}")]
    Library(#[source] LibraryError),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

impl SyncError {
    pub fn persistence(path: impl Into<String>, reason: impl ToString) -> Self {
        SyncError::PersistenceFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<LibraryError> for SyncError {
    fn from(error: LibraryError) -> Self {
        match error {
            LibraryError::Unreachable { library, reason } => {
                SyncError::Unreachable { library, reason }
            }
            LibraryError::NoData { library, reason } => SyncError::NoData { library, reason },
            LibraryError::UpdateRejected {
                library,
                kind,
                id,
                reason,
            } => SyncError::UpdatePushFailed {
                library,
                item: format!("{} {}", kind, id),
                reason,
            },
            other => SyncError::Library(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_error_mapping() {
        let err: SyncError = LibraryError::UpdateRejected {
            library: "Den".to_string(),
            kind: "movie".to_string(),
            id: 42,
            reason: "Kodi rejected the update".to_string(),
        }
        .into();

        assert_eq!(
            err.to_string(),
            "Failed to push update for movie 42 to Den: Kodi rejected the update"
        );

        let err: SyncError = LibraryError::NoData {
            library: "Den".to_string(),
            reason: "null result".to_string(),
        }
        .into();
        assert!(matches!(err, SyncError::NoData { .. }));
    }
}
