// crates/sync-engine/src/merge.rs
//! Local/remote user data merge
//!
//! [`MergeEngine`] deterministically combines the local snapshot, the remote
//! snapshot and the pending local action queue into a merged snapshot, and
//! derives the write-set that brings the remote tree in line with it. It is
//! pure computation: no I/O, no store access. The surrounding orchestrator
//! owns reading and writing the stores.

use crate::error::{SyncError, SyncResult};
use crate::paths;
use crate::write_set::{WriteSet, WriteValue};
use std::collections::BTreeSet;
use summit_core::{SessionId, UserAction, UserActionKind, UserDataSnapshot};

/// Reconciles local and remote user data for one sync pass
///
/// Exactly three snapshots are live during a pass: *local*, *remote* and
/// *merged*. Merged starts from the remote baseline plus the monotone unions
/// of both sides, then pending local actions are folded in.
pub struct MergeEngine {
    /// User data read from the local database
    local: UserDataSnapshot,
    /// User data read from the remote tree
    remote: UserDataSnapshot,
    /// Consensus user data produced by the merge
    merged: UserDataSnapshot,
}

impl MergeEngine {
    /// Creates a merge pass over fully-materialized local and remote snapshots
    ///
    /// Fails fast with [`SyncError::InvalidData`] if either snapshot carries
    /// an empty identifier: a merge must never silently operate on missing
    /// state, and decoded wire data is the one place malformed keys can
    /// appear.
    pub fn new(local: UserDataSnapshot, remote: UserDataSnapshot) -> SyncResult<Self> {
        check_well_formed(&local, "local")?;
        check_well_formed(&remote, "remote")?;
        Ok(Self {
            local,
            remote,
            merged: UserDataSnapshot::new(),
        })
    }

    /// Picks the push key for the merged data
    ///
    /// The remote key wins if it exists: remote is the canonical multi-device
    /// source. The local key is only used when remote has never been set,
    /// e.g. the first sync of a fresh account.
    pub fn merge_push_keys(&mut self) {
        self.merged.push_key = if self.remote.push_key.is_empty() {
            self.local.push_key.clone()
        } else {
            self.remote.push_key.clone()
        };
    }

    /// Builds the merged baseline and folds in pending local actions
    ///
    /// The baseline never shrinks either side's monotone sets: viewed videos
    /// and feedback-submitted sessions are unions of local and remote, and
    /// starred sessions start as a copy of remote. Actions are then applied
    /// in queue order; only actions flagged `requires_sync` affect the
    /// output.
    ///
    /// Star changes are last-writer-wins by timestamp: an action older than
    /// what the accumulator already records is dropped. When two actions of
    /// the same pass touch one session at the same millisecond (a rapid
    /// double-tap), the later-enqueued action overrides; an action merely
    /// tying with the remote baseline does not.
    pub fn merge_pending_actions(&mut self, actions: &[UserAction]) {
        self.merged.union_viewed_videos(&self.remote);
        self.merged.union_viewed_videos(&self.local);
        for (session_id, timestamp) in &self.remote.starred_sessions {
            self.merged
                .starred_sessions
                .insert(session_id.clone(), *timestamp);
        }
        self.merged.union_feedback_submitted(&self.remote);
        self.merged.union_feedback_submitted(&self.local);

        // Session keys written by this fold; a later equal-timestamp action
        // overrides these, never the baseline.
        let mut folded: BTreeSet<SessionId> = BTreeSet::new();

        for action in actions {
            if !action.requires_sync {
                continue;
            }
            match &action.kind {
                UserActionKind::AddStar { session_id } => {
                    if self.star_action_applies(session_id, action, &folded) {
                        self.merged
                            .starred_sessions
                            .insert(session_id.clone(), action.timestamp);
                        folded.insert(session_id.clone());
                    }
                }
                UserActionKind::RemoveStar { session_id } => {
                    if self.star_action_applies(session_id, action, &folded) {
                        self.merged.starred_sessions.remove(session_id);
                        folded.insert(session_id.clone());
                    }
                }
                UserActionKind::ViewVideo { video_id } => {
                    self.merged.viewed_videos.insert(video_id.clone());
                }
                UserActionKind::SubmitFeedback { session_id } => {
                    self.merged.feedback_submitted.insert(session_id.clone());
                }
            }
        }
    }

    /// Returns true if a star change beats what the accumulator records
    fn star_action_applies(
        &self,
        session_id: &SessionId,
        action: &UserAction,
        folded: &BTreeSet<SessionId>,
    ) -> bool {
        match self.merged.starred_sessions.get(session_id) {
            None => true,
            Some(existing) => {
                *existing < action.timestamp
                    || (*existing == action.timestamp && folded.contains(session_id))
            }
        }
    }

    /// Builds the write-set for a single atomic multi-path remote update
    ///
    /// A session is never deleted from the remote tree. Sessions present in
    /// remote data but absent from merged data are flagged out-of-schedule
    /// instead, which preserves history and avoids delete races across
    /// devices.
    pub fn remote_write_set(&self) -> WriteSet {
        let mut write_set = WriteSet::new();

        write_set.insert(
            paths::push_key_path(),
            WriteValue::Text(self.merged.push_key.clone()),
        );

        for video_id in &self.merged.viewed_videos {
            write_set.insert(paths::viewed_video_path(video_id), WriteValue::Bool(true));
        }

        self.handle_starred_sessions(&mut write_set);
        self.handle_unstarred_sessions(&mut write_set);

        for session_id in &self.merged.feedback_submitted {
            write_set.insert(paths::feedback_path(session_id), WriteValue::Bool(true));
        }

        write_set
    }

    /// Marks every merged starred session in-schedule and records its timestamp
    fn handle_starred_sessions(&self, write_set: &mut WriteSet) {
        for (session_id, timestamp) in &self.merged.starred_sessions {
            write_set.insert(paths::in_schedule_path(session_id), WriteValue::Bool(true));
            write_set.insert(
                paths::timestamp_path(session_id),
                WriteValue::Int(timestamp.as_millis()),
            );
        }
    }

    /// Tombstones sessions that left the schedule during the merge
    ///
    /// Merged data is the canonical collection of starred sessions. Sessions
    /// found in remote data but absent in merged data are no longer part of
    /// the user schedule; their in-schedule leaf is set to false. No
    /// timestamp is written for them.
    fn handle_unstarred_sessions(&self, write_set: &mut WriteSet) {
        for session_id in self.remote.starred_sessions.keys() {
            if !self.merged.starred_sessions.contains_key(session_id) {
                write_set.insert(paths::in_schedule_path(session_id), WriteValue::Bool(false));
            }
        }
    }

    /// Returns the merged snapshot
    pub fn merged(&self) -> &UserDataSnapshot {
        &self.merged
    }

    /// Consumes the engine and returns the merged snapshot
    pub fn into_merged(self) -> UserDataSnapshot {
        self.merged
    }

    #[cfg(test)]
    fn local(&self) -> &UserDataSnapshot {
        &self.local
    }

    #[cfg(test)]
    fn remote(&self) -> &UserDataSnapshot {
        &self.remote
    }
}

/// Rejects snapshots carrying empty identifiers
fn check_well_formed(snapshot: &UserDataSnapshot, which: &str) -> SyncResult<()> {
    if snapshot.is_well_formed() {
        Ok(())
    } else {
        Err(SyncError::InvalidData(format!(
            "{} snapshot contains an empty identifier",
            which
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use summit_core::{Timestamp, VideoId};

    fn snapshot(stars: &[(&str, i64)], videos: &[&str], feedback: &[&str]) -> UserDataSnapshot {
        let mut s = UserDataSnapshot::new();
        for (id, ts) in stars {
            s.starred_sessions
                .insert(SessionId::new(*id), Timestamp::from_millis(*ts));
        }
        for id in videos {
            s.viewed_videos.insert(VideoId::new(*id));
        }
        for id in feedback {
            s.feedback_submitted.insert(SessionId::new(*id));
        }
        s
    }

    fn add_star(id: &str, ts: i64) -> UserAction {
        UserAction::add_star(SessionId::new(id)).with_timestamp(Timestamp::from_millis(ts))
    }

    fn remove_star(id: &str, ts: i64) -> UserAction {
        UserAction::remove_star(SessionId::new(id)).with_timestamp(Timestamp::from_millis(ts))
    }

    #[test]
    fn test_new_holds_three_snapshots() {
        let local = snapshot(&[("S1", 10)], &[], &[]);
        let remote = snapshot(&[("S2", 20)], &[], &[]);
        let engine = MergeEngine::new(local.clone(), remote.clone()).unwrap();

        assert_eq!(engine.local(), &local);
        assert_eq!(engine.remote(), &remote);
        assert!(engine.merged().is_empty());
    }

    #[test]
    fn test_new_rejects_malformed_local() {
        let local = snapshot(&[("", 10)], &[], &[]);
        let remote = UserDataSnapshot::new();
        let result = MergeEngine::new(local, remote);
        assert!(matches!(result, Err(SyncError::InvalidData(_))));
    }

    #[test]
    fn test_new_rejects_malformed_remote() {
        let local = UserDataSnapshot::new();
        let remote = snapshot(&[], &[""], &[]);
        let result = MergeEngine::new(local, remote);
        assert!(matches!(result, Err(SyncError::InvalidData(_))));
    }

    #[test]
    fn test_push_key_remote_wins() {
        let mut local = UserDataSnapshot::new();
        local.push_key = "abc".to_string();
        let mut remote = UserDataSnapshot::new();
        remote.push_key = "xyz".to_string();

        let mut engine = MergeEngine::new(local, remote).unwrap();
        engine.merge_push_keys();
        assert_eq!(engine.merged().push_key, "xyz");
    }

    #[test]
    fn test_push_key_falls_back_to_local() {
        let mut local = UserDataSnapshot::new();
        local.push_key = "abc".to_string();
        let remote = UserDataSnapshot::new();

        let mut engine = MergeEngine::new(local, remote).unwrap();
        engine.merge_push_keys();
        assert_eq!(engine.merged().push_key, "abc");
    }

    #[test]
    fn test_baseline_unions_monotone_sets() {
        let local = snapshot(&[], &["V1", "V2"], &["S1"]);
        let remote = snapshot(&[("S9", 100)], &["V2", "V3"], &["S2"]);

        let mut engine = MergeEngine::new(local.clone(), remote.clone()).unwrap();
        engine.merge_pending_actions(&[]);

        let merged = engine.merged();
        // Supersets of both sides, for any input
        for video_id in local.viewed_videos.iter().chain(&remote.viewed_videos) {
            assert!(merged.has_viewed(video_id));
        }
        for session_id in local
            .feedback_submitted
            .iter()
            .chain(&remote.feedback_submitted)
        {
            assert!(merged.has_submitted_feedback(session_id));
        }
        // Starred sessions start as a copy of remote
        assert_eq!(merged.starred_sessions, remote.starred_sessions);
    }

    #[test]
    fn test_fold_add_star_on_fresh_account() {
        let mut engine =
            MergeEngine::new(UserDataSnapshot::new(), UserDataSnapshot::new()).unwrap();
        engine.merge_pending_actions(&[add_star("S9", 500)]);

        assert_eq!(
            engine.merged().starred_sessions.get(&SessionId::new("S9")),
            Some(&Timestamp::from_millis(500))
        );
    }

    #[test]
    fn test_stale_remove_is_dropped() {
        let remote = snapshot(&[("S1", 100)], &[], &[]);
        let mut engine = MergeEngine::new(UserDataSnapshot::new(), remote).unwrap();
        engine.merge_pending_actions(&[remove_star("S1", 50)]);

        assert_eq!(
            engine.merged().starred_sessions.get(&SessionId::new("S1")),
            Some(&Timestamp::from_millis(100))
        );
    }

    #[test]
    fn test_fresh_remove_applies() {
        let remote = snapshot(&[("S1", 100)], &[], &[]);
        let mut engine = MergeEngine::new(UserDataSnapshot::new(), remote).unwrap();
        engine.merge_pending_actions(&[remove_star("S1", 150)]);

        assert!(!engine.merged().is_starred(&SessionId::new("S1")));
    }

    #[test]
    fn test_stale_add_is_dropped() {
        let remote = snapshot(&[("S1", 100)], &[], &[]);
        let mut engine = MergeEngine::new(UserDataSnapshot::new(), remote).unwrap();
        engine.merge_pending_actions(&[add_star("S1", 50)]);

        assert_eq!(
            engine.merged().starred_sessions.get(&SessionId::new("S1")),
            Some(&Timestamp::from_millis(100))
        );
    }

    #[test]
    fn test_equal_timestamp_against_baseline_is_dropped() {
        let remote = snapshot(&[("S1", 100)], &[], &[]);
        let mut engine = MergeEngine::new(UserDataSnapshot::new(), remote).unwrap();
        engine.merge_pending_actions(&[remove_star("S1", 100)]);

        // Ties with the remote baseline do not win
        assert!(engine.merged().is_starred(&SessionId::new("S1")));
    }

    #[test]
    fn test_double_tap_later_action_wins() {
        // Star then unstar within the same millisecond: the unstar stands
        let mut engine =
            MergeEngine::new(UserDataSnapshot::new(), UserDataSnapshot::new()).unwrap();
        engine.merge_pending_actions(&[add_star("S1", 100), remove_star("S1", 100)]);
        assert!(!engine.merged().is_starred(&SessionId::new("S1")));

        // Unstar then star within the same millisecond: the star stands
        let mut engine =
            MergeEngine::new(UserDataSnapshot::new(), UserDataSnapshot::new()).unwrap();
        engine.merge_pending_actions(&[remove_star("S1", 100), add_star("S1", 100)]);
        assert!(engine.merged().is_starred(&SessionId::new("S1")));
    }

    #[test]
    fn test_actions_not_requiring_sync_are_ignored() {
        let mut engine =
            MergeEngine::new(UserDataSnapshot::new(), UserDataSnapshot::new()).unwrap();
        engine.merge_pending_actions(&[
            add_star("S1", 100).already_synced(),
            UserAction::view_video(VideoId::new("V1")).already_synced(),
        ]);

        assert!(!engine.merged().is_starred(&SessionId::new("S1")));
        assert!(!engine.merged().has_viewed(&VideoId::new("V1")));
    }

    #[test]
    fn test_view_video_is_unconditional() {
        let remote = snapshot(&[], &["V1"], &[]);
        let mut engine = MergeEngine::new(UserDataSnapshot::new(), remote).unwrap();
        engine.merge_pending_actions(&[
            UserAction::view_video(VideoId::new("V1")),
            UserAction::view_video(VideoId::new("V2")),
        ]);

        assert!(engine.merged().has_viewed(&VideoId::new("V1")));
        assert!(engine.merged().has_viewed(&VideoId::new("V2")));
        assert_eq!(engine.merged().viewed_videos.len(), 2);
    }

    #[test]
    fn test_submit_feedback_is_unconditional() {
        let mut engine =
            MergeEngine::new(UserDataSnapshot::new(), UserDataSnapshot::new()).unwrap();
        engine.merge_pending_actions(&[
            UserAction::submit_feedback(SessionId::new("S1")),
            UserAction::submit_feedback(SessionId::new("S1")),
        ]);

        assert_eq!(engine.merged().feedback_submitted.len(), 1);
    }

    #[test]
    fn test_fold_is_idempotent() {
        let local = snapshot(&[], &["V1"], &[]);
        let remote = snapshot(&[("S1", 100), ("S2", 200)], &["V2"], &["S3"]);
        let actions = vec![
            add_star("S9", 500),
            remove_star("S1", 150),
            UserAction::view_video(VideoId::new("V3")),
            UserAction::submit_feedback(SessionId::new("S4")),
        ];

        let mut engine = MergeEngine::new(local, remote).unwrap();
        engine.merge_pending_actions(&actions);
        let once = engine.merged().clone();

        engine.merge_pending_actions(&actions);
        let twice = engine.merged().clone();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_write_set_end_to_end_scenario() {
        let mut engine =
            MergeEngine::new(UserDataSnapshot::new(), UserDataSnapshot::new()).unwrap();
        engine.merge_push_keys();
        engine.merge_pending_actions(&[
            add_star("S9", 500),
            UserAction::view_video(VideoId::new("V1")),
        ]);

        let merged = engine.merged();
        assert_eq!(
            merged.starred_sessions.get(&SessionId::new("S9")),
            Some(&Timestamp::from_millis(500))
        );
        assert!(merged.has_viewed(&VideoId::new("V1")));

        let write_set = engine.remote_write_set();
        assert_eq!(
            write_set.get("starredSessions/S9/inSchedule"),
            Some(&WriteValue::Bool(true))
        );
        assert_eq!(
            write_set.get("starredSessions/S9/timestamp"),
            Some(&WriteValue::Int(500))
        );
        assert_eq!(
            write_set.get("viewedVideos/V1"),
            Some(&WriteValue::Bool(true))
        );
    }

    #[test]
    fn test_write_set_tombstones_removed_sessions() {
        let remote = snapshot(&[("S1", 10), ("S2", 20)], &[], &[]);
        let mut engine = MergeEngine::new(UserDataSnapshot::new(), remote).unwrap();
        engine.merge_pending_actions(&[remove_star("S2", 30)]);

        let write_set = engine.remote_write_set();
        assert_eq!(
            write_set.get("starredSessions/S1/inSchedule"),
            Some(&WriteValue::Bool(true))
        );
        assert_eq!(
            write_set.get("starredSessions/S2/inSchedule"),
            Some(&WriteValue::Bool(false))
        );
        // Tombstones carry no timestamp entry
        assert!(!write_set.contains("starredSessions/S2/timestamp"));
    }

    #[test]
    fn test_write_set_includes_push_key_and_feedback() {
        let mut remote = UserDataSnapshot::new();
        remote.push_key = "xyz".to_string();
        let mut engine = MergeEngine::new(UserDataSnapshot::new(), remote).unwrap();
        engine.merge_push_keys();
        engine.merge_pending_actions(&[UserAction::submit_feedback(SessionId::new("S1"))]);

        let write_set = engine.remote_write_set();
        assert_eq!(
            write_set.get("pushKey"),
            Some(&WriteValue::Text("xyz".to_string()))
        );
        assert_eq!(
            write_set.get("feedbackSubmitted/S1"),
            Some(&WriteValue::Bool(true))
        );
    }

    #[test]
    fn test_write_set_values_are_absolute() {
        // Applying the same write-set twice must describe the same state:
        // recomputing from an identical merge yields an identical write-set.
        let remote = snapshot(&[("S1", 10)], &["V1"], &["S2"]);
        let actions = vec![add_star("S3", 40)];

        let mut first = MergeEngine::new(UserDataSnapshot::new(), remote.clone()).unwrap();
        first.merge_push_keys();
        first.merge_pending_actions(&actions);

        let mut second = MergeEngine::new(UserDataSnapshot::new(), remote).unwrap();
        second.merge_push_keys();
        second.merge_pending_actions(&actions);

        assert_eq!(first.remote_write_set(), second.remote_write_set());
    }

    #[test]
    fn test_into_merged() {
        let mut engine =
            MergeEngine::new(UserDataSnapshot::new(), UserDataSnapshot::new()).unwrap();
        engine.merge_pending_actions(&[add_star("S1", 100)]);
        let merged = engine.into_merged();
        assert!(merged.is_starred(&SessionId::new("S1")));
    }
}
