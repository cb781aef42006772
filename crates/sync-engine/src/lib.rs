// crates/sync-engine/src/lib.rs
//! Cross-device user data synchronization engine
//!
//! This crate reconciles the on-device user data store with its cloud
//! replica across multiple devices:
//! - Deterministic local/remote snapshot merging
//! - An offline-capable pending action queue
//! - Idempotent remote write-sets with tombstone semantics
//!
//! # Example
//!
//! ```rust
//! use summit_sync_engine::MergeEngine;
//! use summit_core::{SessionId, Timestamp, UserAction, UserDataSnapshot};
//!
//! let mut engine =
//!     MergeEngine::new(UserDataSnapshot::new(), UserDataSnapshot::new()).unwrap();
//! engine.merge_push_keys();
//! engine.merge_pending_actions(&[
//!     UserAction::add_star(SessionId::new("S9")).with_timestamp(Timestamp::from_millis(500)),
//! ]);
//!
//! assert!(engine.merged().is_starred(&SessionId::new("S9")));
//! ```

mod codec;
mod engine;
mod error;
mod merge;
pub mod paths;
mod queue;
mod store;
mod types;
mod write_set;

pub use codec::{from_json_str, to_json_string};
pub use engine::SyncOrchestrator;
pub use error::{SyncError, SyncResult};
pub use merge::MergeEngine;
pub use queue::ActionQueue;
pub use store::{LocalStore, RemoteStore};
pub use types::{SyncReport, SyncState};
pub use write_set::{WriteSet, WriteValue};
