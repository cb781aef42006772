//! Error types and recovery strategies for Summit
//!
//! This module provides the shared error handling system with three severity tiers:
//! - **Recoverable**: Can be automatically retried (network timeouts, etc.)
//! - **Degraded**: Feature disabled but app continues (push registration lost, etc.)
//! - **Fatal**: Requires app restart or user intervention (corrupted database, etc.)
//!
//! Each error includes a recovery action to guide automatic error handling.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Recovery actions that can be taken when an error occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Retry the operation immediately (e.g., transient network glitch)
    RetryImmediate,
    /// Retry with exponential backoff (e.g., server temporarily unavailable)
    RetryWithBackoff,
    /// Wait for the next sync trigger (timer, connectivity, user refresh)
    RetryOnNextSync,
    /// Disable the failing feature and continue (e.g., push notifications)
    DisableFeature,
    /// No automatic recovery - user intervention required
    UserIntervention,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryImmediate => write!(f, "Retrying immediately"),
            Self::RetryWithBackoff => write!(f, "Retrying with backoff"),
            Self::RetryOnNextSync => write!(f, "Retrying on next sync"),
            Self::DisableFeature => write!(f, "Disabling feature"),
            Self::UserIntervention => write!(f, "User intervention required"),
        }
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Error can be automatically recovered from
    Recoverable,
    /// Feature degraded but app can continue
    Degraded,
    /// Critical error requiring restart or user action
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Main error type for Summit
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Network Errors =====
    /// Network request failed
    #[error("Network error: {message}")]
    NetworkError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Network timeout
    #[error("Network timeout after {seconds}s: {operation}")]
    NetworkTimeout { operation: String, seconds: u64 },

    // ===== Database Errors =====
    /// Database operation failed
    #[error("Database error: {message}")]
    DatabaseError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Database is corrupted and needs repair
    #[error("Database corrupted: {details}")]
    DatabaseCorrupted { details: String },

    /// Database migration failed
    #[error("Migration failed: {version} - {reason}")]
    MigrationFailed { version: String, reason: String },

    /// Database is locked by another process
    #[error("Database locked: {operation}")]
    DatabaseLocked { operation: String },

    /// Record not found in database
    #[error("Record not found: {entity} with {identifier}")]
    RecordNotFound { entity: String, identifier: String },

    // ===== Sync Errors =====
    /// Sync conflict detected
    #[error("Sync conflict: {entity} modified on multiple devices")]
    SyncConflict { entity: String },

    /// Sync authentication failed
    #[error("Sync authentication failed: {provider}")]
    SyncAuthFailed { provider: String },

    // ===== Push Registration Errors =====
    /// Push registration exhausted its retry budget
    #[error("Push registration failed after {attempts} attempts")]
    PushRegistrationFailed { attempts: usize },

    // ===== Configuration Errors =====
    /// Invalid configuration
    #[error("Invalid configuration: {setting} = '{value}' ({reason})")]
    InvalidConfiguration {
        setting: String,
        value: String,
        reason: String,
    },

    // ===== File System Errors =====
    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// General I/O error
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: io::Error,
    },

    // ===== Generic Errors =====
    /// Generic internal error
    #[error("Internal error: {message}")]
    InternalError { message: String },

    /// Operation cancelled
    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },

    /// Invalid argument provided
    #[error("Invalid argument: {argument} - {reason}")]
    InvalidArgument { argument: String, reason: String },
}

impl AppError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Recoverable - can retry automatically
            Self::NetworkError { .. }
            | Self::NetworkTimeout { .. }
            | Self::DatabaseLocked { .. } => ErrorSeverity::Recoverable,

            // Degraded - disable feature but continue
            Self::SyncConflict { .. }
            | Self::SyncAuthFailed { .. }
            | Self::PushRegistrationFailed { .. }
            | Self::RecordNotFound { .. } => ErrorSeverity::Degraded,

            // Fatal - requires restart or user action
            Self::DatabaseCorrupted { .. }
            | Self::MigrationFailed { .. }
            | Self::InvalidConfiguration { .. } => ErrorSeverity::Fatal,

            // Context-dependent - default to degraded
            _ => ErrorSeverity::Degraded,
        }
    }

    /// Returns the recommended recovery action for this error
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            Self::NetworkTimeout { .. } => RecoveryAction::RetryImmediate,

            Self::NetworkError { .. } | Self::DatabaseLocked { .. } => {
                RecoveryAction::RetryWithBackoff
            }

            Self::SyncConflict { .. } => RecoveryAction::RetryOnNextSync,

            Self::PushRegistrationFailed { .. } => RecoveryAction::DisableFeature,

            Self::DatabaseCorrupted { .. }
            | Self::MigrationFailed { .. }
            | Self::InvalidConfiguration { .. }
            | Self::SyncAuthFailed { .. } => RecoveryAction::UserIntervention,

            // Default to user intervention for safety
            _ => RecoveryAction::UserIntervention,
        }
    }

    /// Returns true if this error should be logged at ERROR level
    pub fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Fatal
    }

    /// Returns true if this error can be automatically retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.recovery_action(),
            RecoveryAction::RetryImmediate
                | RecoveryAction::RetryWithBackoff
                | RecoveryAction::RetryOnNextSync
        )
    }

    /// Helper to create a network error from any error type
    pub fn network<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Helper to create a database error from any error type
    pub fn database<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::DatabaseError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Helper to create an invalid-argument error
    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Implement From for common error types
impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound {
                path: PathBuf::from("unknown"),
            },
            _ => Self::IoError {
                message: err.to_string(),
                source: err,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_recovery_action_display() {
        assert_eq!(
            RecoveryAction::RetryImmediate.to_string(),
            "Retrying immediately"
        );
        assert_eq!(
            RecoveryAction::RetryWithBackoff.to_string(),
            "Retrying with backoff"
        );
        assert_eq!(
            RecoveryAction::RetryOnNextSync.to_string(),
            "Retrying on next sync"
        );
        assert_eq!(
            RecoveryAction::UserIntervention.to_string(),
            "User intervention required"
        );
    }

    #[test]
    fn test_error_severity_ordering() {
        assert!(ErrorSeverity::Recoverable < ErrorSeverity::Degraded);
        assert!(ErrorSeverity::Degraded < ErrorSeverity::Fatal);
    }

    #[test]
    fn test_network_error_severity() {
        let err = AppError::NetworkError {
            message: "Connection failed".to_string(),
            source: None,
        };
        assert_eq!(err.severity(), ErrorSeverity::Recoverable);
        assert_eq!(err.recovery_action(), RecoveryAction::RetryWithBackoff);
        assert!(err.is_retryable());
        assert!(!err.is_critical());
    }

    #[test]
    fn test_network_timeout_severity() {
        let err = AppError::NetworkTimeout {
            operation: "remote read".to_string(),
            seconds: 30,
        };
        assert_eq!(err.severity(), ErrorSeverity::Recoverable);
        assert_eq!(err.recovery_action(), RecoveryAction::RetryImmediate);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_database_corrupted_severity() {
        let err = AppError::DatabaseCorrupted {
            details: "Invalid header".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
        assert_eq!(err.recovery_action(), RecoveryAction::UserIntervention);
        assert!(!err.is_retryable());
        assert!(err.is_critical());
    }

    #[test]
    fn test_sync_conflict_retries_on_next_sync() {
        let err = AppError::SyncConflict {
            entity: "starred session".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Degraded);
        assert_eq!(err.recovery_action(), RecoveryAction::RetryOnNextSync);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_push_registration_failed() {
        let err = AppError::PushRegistrationFailed { attempts: 5 };
        assert_eq!(err.severity(), ErrorSeverity::Degraded);
        assert_eq!(err.recovery_action(), RecoveryAction::DisableFeature);
        assert!(err.to_string().contains("5"));
    }

    #[test]
    fn test_invalid_configuration_is_fatal() {
        let err = AppError::InvalidConfiguration {
            setting: "sync.interval_minutes".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
        assert!(err.is_critical());
    }

    #[test]
    fn test_network_helper() {
        let inner_err = io::Error::new(io::ErrorKind::ConnectionRefused, "Connection refused");
        let err = AppError::network("Failed to connect", inner_err);

        assert!(matches!(err, AppError::NetworkError { .. }));
        if let AppError::NetworkError { message, source } = err {
            assert_eq!(message, "Failed to connect");
            assert!(source.is_some());
        }
    }

    #[test]
    fn test_database_helper() {
        let inner_err = io::Error::other("Database locked");
        let err = AppError::database("Query failed", inner_err);

        assert!(matches!(err, AppError::DatabaseError { .. }));
    }

    #[test]
    fn test_invalid_argument_helper() {
        let err = AppError::invalid_argument("snapshot", "contains an empty session id");
        let display = format!("{}", err);
        assert!(display.contains("snapshot"));
        assert!(display.contains("empty session id"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_from_io_error_not_found() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let app_err: AppError = io_err.into();

        assert!(matches!(app_err, AppError::FileNotFound { .. }));
    }

    #[test]
    fn test_from_io_error_other() {
        let io_err = io::Error::other("Unknown error");
        let app_err: AppError = io_err.into();

        assert!(matches!(app_err, AppError::IoError { .. }));
    }

    #[test]
    fn test_error_source_chain() {
        let inner = io::Error::other("Inner error");
        let outer = AppError::network("Outer error", inner);

        assert!(outer.source().is_some());
    }

    #[test]
    fn test_result_type_alias() {
        fn test_function() -> Result<i32> {
            Ok(42)
        }

        assert_eq!(test_function().unwrap(), 42);
    }
}
