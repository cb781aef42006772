// crates/sync-engine/src/engine.rs
//! Sync orchestrator
//!
//! Drives one merge pass at a time for an account: load both snapshots, run
//! the merge engine, push the write-set remotely, persist the merged
//! snapshot locally, and only then let go of the consumed action batch. A
//! failed pass restores the batch verbatim so the next trigger retries it.

use crate::error::{SyncError, SyncResult};
use crate::merge::MergeEngine;
use crate::queue::ActionQueue;
use crate::store::{LocalStore, RemoteStore};
use crate::types::{SyncReport, SyncState};
use std::sync::{Arc, Mutex};
use summit_core::{AccountId, Timestamp, UserAction};

/// Coordinates merge passes between the local and remote stores
///
/// Stores are injected at construction time. At most one pass per
/// orchestrator (and therefore per account) is ever in flight; a trigger
/// arriving while a pass runs gets [`SyncError::AlreadyRunning`] and should
/// simply fire again later.
pub struct SyncOrchestrator {
    account: AccountId,
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
    queue: ActionQueue,
    state: Arc<Mutex<SyncState>>,
}

impl SyncOrchestrator {
    /// Creates an orchestrator for one account
    pub fn new(
        account: AccountId,
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
    ) -> Self {
        Self {
            account,
            local,
            remote,
            queue: ActionQueue::new(),
            state: Arc::new(Mutex::new(SyncState::new())),
        }
    }

    /// Returns the account this orchestrator syncs
    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// Returns the pending action queue
    pub fn queue(&self) -> &ActionQueue {
        &self.queue
    }

    /// Records a user action for the next pass
    pub fn record_action(&self, action: UserAction) -> SyncResult<()> {
        self.queue.enqueue(action)?;
        let mut state = self
            .state
            .lock()
            .map_err(|_| SyncError::Custom("Lock poisoned".to_string()))?;
        state.pending_actions = self.queue.pending_count();
        Ok(())
    }

    /// Gets the current sync state
    pub fn state(&self) -> SyncResult<SyncState> {
        self.state
            .lock()
            .map(|s| s.clone())
            .map_err(|_| SyncError::Custom("Lock poisoned".to_string()))
    }

    /// Runs one full merge pass
    ///
    /// The consumed batch either fully commits or is requeued unchanged; no
    /// partial fold is ever persisted.
    pub async fn sync(&self) -> SyncResult<SyncReport> {
        self.begin_pass()?;

        let batch = match self.queue.take_pending() {
            Ok(batch) => batch,
            Err(e) => {
                self.end_pass(false)?;
                return Err(e);
            }
        };

        log::debug!(
            "Starting sync pass for {} with {} pending action(s)",
            self.account,
            batch.len()
        );

        match self.run_pass(&batch).await {
            Ok(report) => {
                self.end_pass(true)?;
                log::info!(
                    "Sync pass for {} committed: {} remote write(s), {} action(s) consumed",
                    self.account,
                    report.remote_writes,
                    report.actions_consumed
                );
                Ok(report)
            }
            Err(e) => {
                log::warn!("Sync pass for {} failed, requeueing batch: {}", self.account, e);
                self.queue.restore(batch)?;
                self.end_pass(false)?;
                Err(e)
            }
        }
    }

    /// Loads snapshots, merges, and writes both stores
    async fn run_pass(&self, batch: &[UserAction]) -> SyncResult<SyncReport> {
        let local_snapshot = self.local.read(&self.account).await?;
        let remote_snapshot = self.remote.read(&self.account).await?;

        let mut engine = MergeEngine::new(local_snapshot, remote_snapshot)?;
        engine.merge_push_keys();
        engine.merge_pending_actions(batch);

        let write_set = engine.remote_write_set();
        let remote_writes = write_set.len();
        let merged = engine.into_merged();

        // Remote first: its update is one atomic call, and the local write
        // below is transactional, so a failure at either step leaves a state
        // the requeued batch can safely replay against.
        self.remote.apply_write_set(&self.account, &write_set).await?;
        self.local.write(&self.account, &merged).await?;

        Ok(SyncReport {
            merged,
            remote_writes,
            actions_consumed: batch.len(),
        })
    }

    /// Marks a pass as in flight, refusing a second concurrent trigger
    fn begin_pass(&self) -> SyncResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| SyncError::Custom("Lock poisoned".to_string()))?;
        if state.in_progress {
            return Err(SyncError::AlreadyRunning);
        }
        state.in_progress = true;
        Ok(())
    }

    /// Clears the in-flight flag and refreshes progress counters
    fn end_pass(&self, committed: bool) -> SyncResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| SyncError::Custom("Lock poisoned".to_string()))?;
        state.in_progress = false;
        state.pending_actions = self.queue.pending_count();
        if committed {
            state.last_sync = Some(Timestamp::now());
        }
        Ok(())
    }
}
