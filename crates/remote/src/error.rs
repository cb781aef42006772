// crates/remote/src/error.rs
//! Error types for remote store operations

use thiserror::Error;

/// Result type for remote store operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur talking to the remote user data tree
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Underlying HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Remote returned HTTP {code}")]
    Status { code: u16 },

    /// The document tree did not have the expected shape
    #[error("Invalid remote tree: {0}")]
    InvalidTree(String),

    /// No replica URL is configured
    #[error("No remote replica URLs configured")]
    NotConfigured,

    /// JSON decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<RemoteError> for summit_sync_engine::SyncError {
    fn from(err: RemoteError) -> Self {
        summit_sync_engine::SyncError::Network(err.to_string())
    }
}
