// crates/resilience/src/error.rs
//! Error types for resilience operations

use thiserror::Error;

/// Result type for resilience operations
pub type ResilienceResult<T> = Result<T, ResilienceError>;

/// Errors that can occur in resilience operations
#[derive(Debug, Error)]
pub enum ResilienceError {
    /// All retry attempts exhausted
    #[error("All {attempts} retry attempts exhausted: {last_error}")]
    RetriesExhausted { attempts: usize, last_error: String },

    /// Custom error
    #[error("{0}")]
    Custom(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_exhausted_error() {
        let err = ResilienceError::RetriesExhausted {
            attempts: 3,
            last_error: "connection failed".to_string(),
        };
        assert!(err.to_string().contains("3"));
        assert!(err.to_string().contains("connection failed"));
    }

    #[test]
    fn test_custom_error() {
        let err = ResilienceError::Custom("something else".to_string());
        assert_eq!(err.to_string(), "something else");
    }
}
