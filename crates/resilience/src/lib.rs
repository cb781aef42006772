// crates/resilience/src/lib.rs
//! Resilience patterns for fault-tolerant operations
//!
//! This module provides retry with exponential backoff, used by the
//! push-registration flow and other transient network operations.
//!
//! # Example
//!
//! ```rust
//! use summit_resilience::RetryPolicy;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(5)
//!     .with_initial_delay(Duration::from_secs(2));
//! assert_eq!(policy.max_attempts(), 5);
//! ```

mod error;
mod retry;

pub use error::{ResilienceError, ResilienceResult};
pub use retry::{with_retry, RetryPolicy};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_exports_accessible() {
        let _: RetryPolicy = RetryPolicy::default();
    }
}
