// crates/sync-engine/src/queue.rs
//! Pending user-action queue
//!
//! Actions are captured in the order the user performed them, and that order
//! is what the merge fold relies on to break same-millisecond ties. A batch
//! taken for a sync pass is consumed exactly once: the pass either commits,
//! or the batch is restored verbatim at the front of the queue.

use crate::error::{SyncError, SyncResult};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use summit_core::UserAction;

/// Ordered queue of pending user actions awaiting a sync pass
#[derive(Clone, Default)]
pub struct ActionQueue {
    actions: Arc<Mutex<VecDeque<UserAction>>>,
}

impl ActionQueue {
    /// Creates an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an action in user order
    pub fn enqueue(&self, action: UserAction) -> SyncResult<()> {
        let mut actions = self
            .actions
            .lock()
            .map_err(|_| SyncError::Custom("Lock poisoned".to_string()))?;
        actions.push_back(action);
        Ok(())
    }

    /// Appends a batch of actions, preserving their order
    pub fn enqueue_all(&self, batch: impl IntoIterator<Item = UserAction>) -> SyncResult<()> {
        let mut actions = self
            .actions
            .lock()
            .map_err(|_| SyncError::Custom("Lock poisoned".to_string()))?;
        actions.extend(batch);
        Ok(())
    }

    /// Removes and returns every pending action, oldest first
    ///
    /// The caller owns the batch from here: commit the pass or hand the
    /// batch back through [`ActionQueue::restore`].
    pub fn take_pending(&self) -> SyncResult<Vec<UserAction>> {
        let mut actions = self
            .actions
            .lock()
            .map_err(|_| SyncError::Custom("Lock poisoned".to_string()))?;
        Ok(actions.drain(..).collect())
    }

    /// Puts a taken batch back at the front of the queue, unchanged
    ///
    /// Actions enqueued while the failed pass was running stay behind the
    /// restored batch, keeping user order intact.
    pub fn restore(&self, batch: Vec<UserAction>) -> SyncResult<()> {
        let mut actions = self
            .actions
            .lock()
            .map_err(|_| SyncError::Custom("Lock poisoned".to_string()))?;
        for action in batch.into_iter().rev() {
            actions.push_front(action);
        }
        Ok(())
    }

    /// Returns the number of pending actions
    pub fn pending_count(&self) -> usize {
        self.actions.lock().map(|a| a.len()).unwrap_or(0)
    }

    /// Returns true if no actions are pending
    pub fn is_empty(&self) -> bool {
        self.pending_count() == 0
    }
}
