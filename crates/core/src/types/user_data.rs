//! Reconciled per-account user data
//!
//! [`UserDataSnapshot`] is a fully-materialized value: local, remote and
//! merged user data are all expressed as snapshots during a sync pass. The
//! type is a plain record; JSON and document-tree encodings live in their
//! own adapters so storage formats never leak into merge logic.

use crate::types::{SessionId, Timestamp, UserAction, UserActionKind, VideoId};
use std::collections::{BTreeMap, BTreeSet};

/// All user-specific data that is synchronized across devices for one account
///
/// Every container is always present; an empty map or set means "nothing
/// recorded", never "unknown". Presence of a session key in
/// `starred_sessions` means the session is currently in the user's schedule;
/// absence means it is not (whether it was never starred or explicitly
/// unstarred - the two are deliberately indistinguishable here).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDataSnapshot {
    /// Session id mapped to the time it was last starred or unstarred,
    /// in milliseconds since epoch
    pub starred_sessions: BTreeMap<SessionId, Timestamp>,
    /// Videos ever watched. Append-only: ids are never removed.
    pub viewed_videos: BTreeSet<VideoId>,
    /// Sessions with feedback submitted. Append-only: ids are never removed.
    pub feedback_submitted: BTreeSet<SessionId>,
    /// Opaque push-registration key; empty means not yet registered
    pub push_key: String,
}

impl UserDataSnapshot {
    /// Creates an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot purely from a list of user actions
    ///
    /// Useful when the only known state is what the user did, e.g. turning a
    /// replayed action log into a comparable value.
    pub fn from_actions(actions: &[UserAction]) -> Self {
        let mut snapshot = Self::new();
        for action in actions {
            snapshot.apply_action(action);
        }
        snapshot
    }

    /// Applies a single user action to this snapshot
    ///
    /// Star changes overwrite unconditionally: the snapshot mirrors local
    /// intent, conflict resolution against other devices happens elsewhere.
    pub fn apply_action(&mut self, action: &UserAction) {
        match &action.kind {
            UserActionKind::AddStar { session_id } => {
                self.starred_sessions
                    .insert(session_id.clone(), action.timestamp);
            }
            UserActionKind::RemoveStar { session_id } => {
                self.starred_sessions.remove(session_id);
            }
            UserActionKind::ViewVideo { video_id } => {
                self.viewed_videos.insert(video_id.clone());
            }
            UserActionKind::SubmitFeedback { session_id } => {
                self.feedback_submitted.insert(session_id.clone());
            }
        }
    }

    /// Returns true if the session is currently in the user's schedule
    pub fn is_starred(&self, session_id: &SessionId) -> bool {
        self.starred_sessions.contains_key(session_id)
    }

    /// Returns true if the video has been watched
    pub fn has_viewed(&self, video_id: &VideoId) -> bool {
        self.viewed_videos.contains(video_id)
    }

    /// Returns true if feedback was submitted for the session
    pub fn has_submitted_feedback(&self, session_id: &SessionId) -> bool {
        self.feedback_submitted.contains(session_id)
    }

    /// Returns true if nothing has been recorded for this account
    pub fn is_empty(&self) -> bool {
        self.starred_sessions.is_empty()
            && self.viewed_videos.is_empty()
            && self.feedback_submitted.is_empty()
            && self.push_key.is_empty()
    }

    /// Adds every viewed video from `other` into this snapshot
    pub fn union_viewed_videos(&mut self, other: &UserDataSnapshot) {
        for video_id in &other.viewed_videos {
            self.viewed_videos.insert(video_id.clone());
        }
    }

    /// Adds every feedback-submitted session from `other` into this snapshot
    pub fn union_feedback_submitted(&mut self, other: &UserDataSnapshot) {
        for session_id in &other.feedback_submitted {
            self.feedback_submitted.insert(session_id.clone());
        }
    }

    /// Returns true if no container holds an empty identifier
    ///
    /// Decoded wire data can carry empty keys where the original tree was
    /// malformed; merge passes refuse to operate on such snapshots.
    pub fn is_well_formed(&self) -> bool {
        self.starred_sessions.keys().all(|id| !id.is_empty())
            && self.viewed_videos.iter().all(|id| !id.is_empty())
            && self.feedback_submitted.iter().all(|id| !id.is_empty())
    }
}
