// crates/remote/src/memory.rs
//! In-memory remote store
//!
//! A drop-in replica used by tests and offline development. Write-sets are
//! applied to the tree under one lock, mirroring the server's atomic
//! multi-path update, and failures can be injected to exercise the
//! orchestrator's requeue path.

use crate::error::RemoteResult;
use crate::tree;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use summit_core::{AccountId, UserDataSnapshot};
use summit_sync_engine::{RemoteStore, SyncError, SyncResult, WriteSet};

/// In-memory document tree implementing the remote store boundary
#[derive(Clone, Default)]
pub struct InMemoryRemoteStore {
    trees: Arc<Mutex<HashMap<AccountId, Value>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryRemoteStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the tree map, recovering from a poisoned lock
    fn lock_trees(&self) -> std::sync::MutexGuard<'_, HashMap<AccountId, Value>> {
        self.trees.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seeds an account's tree directly
    pub fn insert_tree(&self, account: AccountId, value: Value) {
        self.lock_trees().insert(account, value);
    }

    /// Returns a copy of an account's tree, if any
    pub fn tree(&self, account: &AccountId) -> Option<Value> {
        self.lock_trees().get(account).cloned()
    }

    /// Makes subsequent reads fail with a transient error
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent write-set applications fail with a transient error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Decodes an account's current snapshot
    pub fn snapshot(&self, account: &AccountId) -> RemoteResult<UserDataSnapshot> {
        let trees = self.lock_trees();
        match trees.get(account) {
            Some(value) => tree::snapshot_from_tree(value),
            None => Ok(UserDataSnapshot::new()),
        }
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn read(&self, account: &AccountId) -> SyncResult<UserDataSnapshot> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SyncError::Network("remote read unavailable".to_string()));
        }
        Ok(self.snapshot(account)?)
    }

    async fn apply_write_set(&self, account: &AccountId, write_set: &WriteSet) -> SyncResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SyncError::Network("remote write unavailable".to_string()));
        }
        // One lock span: all paths land or none do
        let mut trees = self.lock_trees();
        let entry = trees.entry(account.clone()).or_insert(Value::Null);
        tree::apply_write_set_to_tree(entry, write_set);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use summit_core::{SessionId, Timestamp, UserAction, UserDataSnapshot, VideoId};
    use summit_sync_engine::MergeEngine;

    fn account() -> AccountId {
        AccountId::new("user@example.com")
    }

    #[tokio::test]
    async fn test_read_unknown_account_is_empty() {
        let store = InMemoryRemoteStore::new();
        let snapshot = store.read(&account()).await.unwrap();
        assert_eq!(snapshot, UserDataSnapshot::new());
    }

    #[tokio::test]
    async fn test_apply_then_read_roundtrip() {
        let store = InMemoryRemoteStore::new();

        let mut engine =
            MergeEngine::new(UserDataSnapshot::new(), UserDataSnapshot::new()).unwrap();
        engine.merge_push_keys();
        engine.merge_pending_actions(&[
            UserAction::add_star(SessionId::new("S9")).with_timestamp(Timestamp::from_millis(500)),
            UserAction::view_video(VideoId::new("V1")),
        ]);
        let write_set = engine.remote_write_set();
        let merged = engine.into_merged();

        store.apply_write_set(&account(), &write_set).await.unwrap();

        let read_back = store.read(&account()).await.unwrap();
        assert_eq!(read_back, merged);
    }

    #[tokio::test]
    async fn test_apply_twice_yields_same_state() {
        let store = InMemoryRemoteStore::new();

        let mut engine =
            MergeEngine::new(UserDataSnapshot::new(), UserDataSnapshot::new()).unwrap();
        engine.merge_pending_actions(&[
            UserAction::add_star(SessionId::new("S1")).with_timestamp(Timestamp::from_millis(100)),
        ]);
        let write_set = engine.remote_write_set();

        store.apply_write_set(&account(), &write_set).await.unwrap();
        let once = store.tree(&account()).unwrap();

        store.apply_write_set(&account(), &write_set).await.unwrap();
        let twice = store.tree(&account()).unwrap();

        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_injected_write_failure() {
        let store = InMemoryRemoteStore::new();
        store.set_fail_writes(true);

        let result = store.apply_write_set(&account(), &WriteSet::new()).await;
        assert!(matches!(result, Err(SyncError::Network(_))));

        store.set_fail_writes(false);
        assert!(store
            .apply_write_set(&account(), &WriteSet::new())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_injected_read_failure() {
        let store = InMemoryRemoteStore::new();
        store.set_fail_reads(true);

        let result = store.read(&account()).await;
        assert!(matches!(result, Err(SyncError::Network(_))));
    }

    #[tokio::test]
    async fn test_accounts_are_isolated() {
        let store = InMemoryRemoteStore::new();
        let other = AccountId::new("other@example.com");

        let mut write_set = WriteSet::new();
        write_set.insert(
            "viewedVideos/V1",
            summit_sync_engine::WriteValue::Bool(true),
        );
        store.apply_write_set(&account(), &write_set).await.unwrap();

        assert!(store.read(&other).await.unwrap().viewed_videos.is_empty());
    }
}
