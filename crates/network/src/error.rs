// crates/network/src/error.rs
//! Error types for network operations

use thiserror::Error;

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors that can occur in network operations
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Underlying HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server returned HTTP {code}")]
    Status { code: u16 },

    /// The push feature is not configured
    #[error("Push registration disabled: {reason}")]
    Disabled { reason: String },

    /// Registration exhausted its retry budget
    #[error("Registration failed after {attempts} attempts: {last_error}")]
    RegistrationFailed { attempts: usize, last_error: String },

    /// Custom error
    #[error("{0}")]
    Custom(String),
}
