// crates/sync-engine/src/error.rs
//! Error types for sync operations

use thiserror::Error;

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during synchronization
#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid sync data
    #[error("Invalid sync data: {0}")]
    InvalidData(String),

    /// A sync pass for this account is already in flight
    #[error("Sync already in progress")]
    AlreadyRunning,

    /// Network error during sync
    #[error("Network error: {0}")]
    Network(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Custom error
    #[error("{0}")]
    Custom(String),
}
