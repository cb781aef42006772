// crates/remote/src/lib.rs
//! Remote user data store
//!
//! Adapters for the cloud-hosted replica of the per-account user data tree:
//! - `RestRemoteStore`: HTTP client reading the tree and pushing write-sets
//!   as single atomic multi-path updates
//! - `InMemoryRemoteStore`: in-process replica for tests and offline use
//! - The document tree codec shared by both

mod client;
mod error;
mod memory;
mod tree;

pub use client::{RemoteConfig, RestRemoteStore};
pub use error::{RemoteError, RemoteResult};
pub use memory::InMemoryRemoteStore;
pub use tree::{apply_write_set_to_tree, snapshot_from_tree, write_set_to_value};
