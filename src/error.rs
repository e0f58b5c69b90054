use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsoleError {
    // Storage errors
    #[error("Failed to read state from '{path}': {source}")]
    StorageRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write state to '{path}': {source}")]
    StorageWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored data under '{key}' is corrupt: {source}")]
    CorruptData {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    // Store contract errors
    #[error("A {collection} record with id '{id}' already exists")]
    DuplicateId { collection: String, id: String },

    #[error("Invalid update for {collection}: {message}")]
    InvalidPatch { collection: String, message: String },

    #[error("User not found: {id}")]
    UnknownUser { id: String },

    #[error("Time slot not found: {id}")]
    UnknownTimeSlot { id: String },

    // Authentication errors
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Your account is currently Inactive. Please contact an administrator.")]
    AccountInactive,

    // Admin errors
    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Invalid input: {message}")]
    Validation { message: String },

    // Generic errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<std::io::Error> for ConsoleError {
    fn from(err: std::io::Error) -> Self {
        ConsoleError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        ConsoleError::Internal {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
