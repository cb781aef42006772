// crates/sync-engine/src/store.rs
//! Store adapter traits
//!
//! The merge engine never touches storage; these traits are the boundary it
//! is driven through. The local store is the on-device database, the remote
//! store is the cloud document tree. Implementations are injected into the
//! orchestrator at construction time.

use crate::error::SyncResult;
use crate::write_set::WriteSet;
use async_trait::async_trait;
use summit_core::{AccountId, UserAction, UserDataSnapshot};

/// On-device persistent user data store
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Reads the full snapshot for an account
    async fn read(&self, account: &AccountId) -> SyncResult<UserDataSnapshot>;

    /// Replaces the account's persisted data with the given snapshot
    ///
    /// Must be transactional: each logical bucket is cleared and re-inserted
    /// scoped to the account, and a failure leaves no partial write behind.
    async fn write(&self, account: &AccountId, snapshot: &UserDataSnapshot) -> SyncResult<()>;

    /// Applies queued actions directly to the persisted local data
    ///
    /// The local store always reflects local intent immediately; replay does
    /// not involve the merge engine. The whole batch commits as one
    /// transaction.
    async fn replay(&self, account: &AccountId, actions: &[UserAction]) -> SyncResult<()>;
}

/// Cloud-hosted replica of the user data tree
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Reads the full snapshot for an account
    async fn read(&self, account: &AccountId) -> SyncResult<UserDataSnapshot>;

    /// Applies a write-set as a single atomic multi-path update
    ///
    /// Partial failure must not leave a half-applied write-set; that
    /// contract is delegated to the backing store's multi-path update.
    async fn apply_write_set(&self, account: &AccountId, write_set: &WriteSet) -> SyncResult<()>;
}
