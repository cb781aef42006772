// crates/sync-engine/src/paths.rs
//! Remote document tree path scheme
//!
//! The remote replica is a flat tree of boolean and integer leaves under each
//! account. All paths are relative to the account root; the remote store
//! prepends its own base URL and account segment.
//!
//! ```text
//! pushKey
//! viewedVideos/{videoId}
//! starredSessions/{sessionId}/inSchedule
//! starredSessions/{sessionId}/timestamp
//! feedbackSubmitted/{sessionId}
//! ```

use summit_core::{SessionId, VideoId};

/// Node holding the account's push-registration key
pub const PUSH_KEY_NODE: &str = "pushKey";

/// Subtree of watched videos
pub const VIEWED_VIDEOS_NODE: &str = "viewedVideos";

/// Subtree of sessions ever added to the schedule
pub const STARRED_SESSIONS_NODE: &str = "starredSessions";

/// Subtree of sessions with feedback submitted
pub const FEEDBACK_SUBMITTED_NODE: &str = "feedbackSubmitted";

/// Leaf marking whether a starred session is currently in the schedule
pub const IN_SCHEDULE_LEAF: &str = "inSchedule";

/// Leaf holding the time a session was last starred or unstarred
pub const TIMESTAMP_LEAF: &str = "timestamp";

/// Path to the push-registration key
pub fn push_key_path() -> String {
    PUSH_KEY_NODE.to_string()
}

/// Path to a watched video's marker leaf
pub fn viewed_video_path(video_id: &VideoId) -> String {
    format!("{}/{}", VIEWED_VIDEOS_NODE, video_id)
}

/// Path to a session's in-schedule flag
pub fn in_schedule_path(session_id: &SessionId) -> String {
    format!(
        "{}/{}/{}",
        STARRED_SESSIONS_NODE, session_id, IN_SCHEDULE_LEAF
    )
}

/// Path to a session's star/unstar timestamp
pub fn timestamp_path(session_id: &SessionId) -> String {
    format!("{}/{}/{}", STARRED_SESSIONS_NODE, session_id, TIMESTAMP_LEAF)
}

/// Path to a session's feedback-submitted marker leaf
pub fn feedback_path(session_id: &SessionId) -> String {
    format!("{}/{}", FEEDBACK_SUBMITTED_NODE, session_id)
}
