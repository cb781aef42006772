// crates/sync-engine/tests/sync_tests.rs
//! Integration tests for the sync engine
//!
//! Drives full orchestrator passes for two devices sharing one remote
//! replica, the way two phones signed into the same account behave.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use summit_core::{AccountId, SessionId, Timestamp, UserAction, UserDataSnapshot, VideoId};
use summit_remote::InMemoryRemoteStore;
use summit_sync_engine::{LocalStore, SyncOrchestrator, SyncResult};

/// Simple in-memory local store standing in for one device's database
#[derive(Default)]
struct DeviceLocalStore {
    data: Mutex<HashMap<AccountId, UserDataSnapshot>>,
}

#[async_trait]
impl LocalStore for DeviceLocalStore {
    async fn read(&self, account: &AccountId) -> SyncResult<UserDataSnapshot> {
        Ok(self
            .data
            .lock()
            .unwrap()
            .get(account)
            .cloned()
            .unwrap_or_default())
    }

    async fn write(&self, account: &AccountId, snapshot: &UserDataSnapshot) -> SyncResult<()> {
        self.data
            .lock()
            .unwrap()
            .insert(account.clone(), snapshot.clone());
        Ok(())
    }

    async fn replay(&self, account: &AccountId, actions: &[UserAction]) -> SyncResult<()> {
        let mut data = self.data.lock().unwrap();
        let snapshot = data.entry(account.clone()).or_default();
        for action in actions {
            snapshot.apply_action(action);
        }
        Ok(())
    }
}

fn account() -> AccountId {
    AccountId::new("user@example.com")
}

fn device(remote: &Arc<InMemoryRemoteStore>) -> (SyncOrchestrator, Arc<DeviceLocalStore>) {
    let local = Arc::new(DeviceLocalStore::default());
    let orchestrator = SyncOrchestrator::new(account(), local.clone(), remote.clone());
    (orchestrator, local)
}

fn star(id: &str, ts: i64) -> UserAction {
    UserAction::add_star(SessionId::new(id)).with_timestamp(Timestamp::from_millis(ts))
}

fn unstar(id: &str, ts: i64) -> UserAction {
    UserAction::remove_star(SessionId::new(id)).with_timestamp(Timestamp::from_millis(ts))
}

#[tokio::test]
async fn test_basic_sync_workflow() {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let (orchestrator, local) = device(&remote);

    orchestrator.record_action(star("S9", 500)).unwrap();
    orchestrator
        .record_action(UserAction::view_video(VideoId::new("V1")))
        .unwrap();

    let state = orchestrator.state().unwrap();
    assert_eq!(state.pending_actions, 2);

    let report = orchestrator.sync().await.unwrap();
    assert_eq!(report.actions_consumed, 2);

    // Both stores converged on the merged snapshot
    let local_snapshot = local.read(&account()).await.unwrap();
    let remote_snapshot = remote.snapshot(&account()).unwrap();
    assert_eq!(local_snapshot, report.merged);
    assert_eq!(remote_snapshot, report.merged);

    let state = orchestrator.state().unwrap();
    assert_eq!(state.pending_actions, 0);
    assert!(state.has_synced());
}

#[tokio::test]
async fn test_two_devices_converge() {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let (phone, _) = device(&remote);
    let (tablet, tablet_local) = device(&remote);

    // The phone stars a session and pushes it
    phone.record_action(star("S1", 100)).unwrap();
    phone.sync().await.unwrap();

    // The tablet syncs with no local changes and picks it up
    let report = tablet.sync().await.unwrap();
    assert!(report.merged.is_starred(&SessionId::new("S1")));
    assert!(tablet_local
        .read(&account())
        .await
        .unwrap()
        .is_starred(&SessionId::new("S1")));
}

#[tokio::test]
async fn test_unstar_propagates_as_tombstone() {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let (phone, _) = device(&remote);
    let (tablet, _) = device(&remote);

    phone.record_action(star("S1", 100)).unwrap();
    phone.sync().await.unwrap();
    tablet.sync().await.unwrap();

    // The tablet later removes the session
    tablet.record_action(unstar("S1", 200)).unwrap();
    tablet.sync().await.unwrap();

    // The remote tree keeps the record, flagged out-of-schedule
    let tree = remote.tree(&account()).unwrap();
    assert_eq!(tree["starredSessions"]["S1"]["inSchedule"], false);

    // The phone converges on the removal
    let report = phone.sync().await.unwrap();
    assert!(!report.merged.is_starred(&SessionId::new("S1")));
}

#[tokio::test]
async fn test_stale_unstar_loses_to_newer_star() {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let (phone, _) = device(&remote);
    let (tablet, _) = device(&remote);

    // The phone stars at t=300 and syncs
    phone.record_action(star("S1", 300)).unwrap();
    phone.sync().await.unwrap();

    // The tablet queued an unstar at t=200 while offline; it syncs later
    tablet.record_action(unstar("S1", 200)).unwrap();
    let report = tablet.sync().await.unwrap();

    // The newer remote star wins over the stale queued unstar
    assert!(report.merged.is_starred(&SessionId::new("S1")));
}

#[tokio::test]
async fn test_viewed_videos_union_across_devices() {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let (phone, _) = device(&remote);
    let (tablet, _) = device(&remote);

    phone
        .record_action(UserAction::view_video(VideoId::new("V1")))
        .unwrap();
    phone.sync().await.unwrap();

    tablet
        .record_action(UserAction::view_video(VideoId::new("V2")))
        .unwrap();
    let report = tablet.sync().await.unwrap();

    // Watched lists only ever grow
    assert!(report.merged.has_viewed(&VideoId::new("V1")));
    assert!(report.merged.has_viewed(&VideoId::new("V2")));
}

#[tokio::test]
async fn test_failed_pass_retries_cleanly() {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let (phone, local) = device(&remote);

    phone.record_action(star("S1", 100)).unwrap();

    remote.set_fail_writes(true);
    assert!(phone.sync().await.is_err());

    // Nothing committed anywhere; the action is still queued
    assert!(local.read(&account()).await.unwrap().is_empty());
    assert_eq!(phone.state().unwrap().pending_actions, 1);

    remote.set_fail_writes(false);
    let report = phone.sync().await.unwrap();
    assert!(report.merged.is_starred(&SessionId::new("S1")));
}

#[tokio::test]
async fn test_push_key_survives_merge_from_either_side() {
    let remote = Arc::new(InMemoryRemoteStore::new());

    // A device registered locally before any remote state exists; its key
    // flows out on first sync
    let local = Arc::new(DeviceLocalStore::default());
    local
        .write(
            &account(),
            &UserDataSnapshot {
                push_key: "phone-key".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let orchestrator = SyncOrchestrator::new(account(), local, remote.clone());
    orchestrator.sync().await.unwrap();
    assert_eq!(remote.snapshot(&account()).unwrap().push_key, "phone-key");

    // A second device with its own key loses to the canonical remote key
    let other_local = Arc::new(DeviceLocalStore::default());
    other_local
        .write(
            &account(),
            &UserDataSnapshot {
                push_key: "tablet-key".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let other = SyncOrchestrator::new(account(), other_local, remote.clone());
    let report = other.sync().await.unwrap();
    assert_eq!(report.merged.push_key, "phone-key");
}
