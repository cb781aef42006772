//! User action domain model
//!
//! A [`UserAction`] records one user-initiated change the instant it happens:
//! starring or unstarring a session, watching a video, or submitting session
//! feedback. Actions are queued in the order the user performed them and
//! consumed exactly once by a sync pass.

use crate::types::{SessionId, Timestamp, VideoId};
use serde::{Deserialize, Serialize};

/// The kind of change a user made, with the identifier it targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserActionKind {
    /// Session was added to the user's schedule
    AddStar { session_id: SessionId },
    /// Session was removed from the user's schedule
    RemoveStar { session_id: SessionId },
    /// Video was watched in the video library
    ViewVideo { video_id: VideoId },
    /// Feedback was submitted for a session
    SubmitFeedback { session_id: SessionId },
}

impl UserActionKind {
    /// Returns the session ID this action targets, if any
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            Self::AddStar { session_id }
            | Self::RemoveStar { session_id }
            | Self::SubmitFeedback { session_id } => Some(session_id),
            Self::ViewVideo { .. } => None,
        }
    }

    /// Returns the video ID this action targets, if any
    pub fn video_id(&self) -> Option<&VideoId> {
        match self {
            Self::ViewVideo { video_id } => Some(video_id),
            _ => None,
        }
    }

    /// Returns the target identifier as a string slice, regardless of kind
    pub fn target(&self) -> &str {
        match self {
            Self::AddStar { session_id }
            | Self::RemoveStar { session_id }
            | Self::SubmitFeedback { session_id } => session_id.as_str(),
            Self::ViewVideo { video_id } => video_id.as_str(),
        }
    }
}

/// A single user-initiated change, queued for synchronization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAction {
    /// What changed and which item it targets
    pub kind: UserActionKind,
    /// Client clock at the time of the action, in milliseconds since epoch.
    /// Used to break conflicts across devices (last writer wins).
    pub timestamp: Timestamp,
    /// False for actions already known to be reflected remotely
    pub requires_sync: bool,
}

impl UserAction {
    /// Creates an action stamped with the current time that requires sync
    pub fn new(kind: UserActionKind) -> Self {
        Self {
            kind,
            timestamp: Timestamp::now(),
            requires_sync: true,
        }
    }

    /// Creates an add-star action for a session
    pub fn add_star(session_id: SessionId) -> Self {
        Self::new(UserActionKind::AddStar { session_id })
    }

    /// Creates a remove-star action for a session
    pub fn remove_star(session_id: SessionId) -> Self {
        Self::new(UserActionKind::RemoveStar { session_id })
    }

    /// Creates a video-viewed action
    pub fn view_video(video_id: VideoId) -> Self {
        Self::new(UserActionKind::ViewVideo { video_id })
    }

    /// Creates a feedback-submitted action for a session
    pub fn submit_feedback(session_id: SessionId) -> Self {
        Self::new(UserActionKind::SubmitFeedback { session_id })
    }

    /// Overrides the action timestamp (replayed or imported actions)
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Marks the action as already reflected remotely
    pub fn already_synced(mut self) -> Self {
        self.requires_sync = false;
        self
    }

    /// Returns true if this action changes the starred-sessions map
    pub fn is_star_change(&self) -> bool {
        matches!(
            self.kind,
            UserActionKind::AddStar { .. } | UserActionKind::RemoveStar { .. }
        )
    }
}
