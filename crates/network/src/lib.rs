// crates/network/src/lib.rs
//! Push server client
//!
//! Thin HTTP contract with the push server: register an account/device pair
//! (retried with exponential backoff), unregister it best-effort, and nudge
//! the user's other devices to sync after local changes are pushed.

mod error;
mod registration;

pub use error::{NetworkError, NetworkResult};
pub use registration::{PushConfig, PushRegistrationClient, Registration};
