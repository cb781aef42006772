// crates/sync-engine/src/types.rs
//! Sync progress types

use serde::{Deserialize, Serialize};
use summit_core::Timestamp;

/// Sync state for tracking progress
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncState {
    /// When the last successful pass finished, if any
    pub last_sync: Option<Timestamp>,
    /// Number of actions pending upload
    pub pending_actions: usize,
    /// Whether a pass is currently in flight
    pub in_progress: bool,
}

impl SyncState {
    /// Creates a fresh sync state
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are pending actions
    pub fn has_pending_actions(&self) -> bool {
        self.pending_actions > 0
    }

    /// Returns true if at least one pass has completed
    pub fn has_synced(&self) -> bool {
        self.last_sync.is_some()
    }
}

/// Summary of one committed sync pass
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// The merged snapshot written to both stores
    pub merged: summit_core::UserDataSnapshot,
    /// Number of remote paths written
    pub remote_writes: usize,
    /// Number of pending actions consumed by the pass
    pub actions_consumed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_state_default() {
        let state = SyncState::new();
        assert_eq!(state.pending_actions, 0);
        assert!(!state.in_progress);
        assert!(!state.has_pending_actions());
        assert!(!state.has_synced());
    }

    #[test]
    fn test_sync_state_with_pending() {
        let state = SyncState {
            last_sync: Some(Timestamp::from_millis(1000)),
            pending_actions: 2,
            in_progress: false,
        };
        assert!(state.has_pending_actions());
        assert!(state.has_synced());
    }
}
