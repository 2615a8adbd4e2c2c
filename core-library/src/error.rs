use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Library {library} is unreachable: {reason}")]
    Unreachable { library: String, reason: String },

    #[error("Library {library} returned no data: {reason}")]
    NoData { library: String, reason: String },

    #[error("Library {library} rejected update for {kind} {id}: {reason}")]
    UpdateRejected {
        library: String,
        kind: String,
        id: u64,
        reason: String,
    },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, LibraryError>;
