// crates/sync-engine/src/codec.rs
//! Snapshot JSON codec
//!
//! [`UserDataSnapshot`] is a plain record; this adapter owns its JSON wire
//! format. The attribute names match the historical export format, and
//! missing fields decode to empty containers so older exports stay readable.

use crate::error::SyncResult;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use summit_core::{SessionId, Timestamp, UserDataSnapshot, VideoId};

/// Wire representation of a snapshot
#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotWire {
    #[serde(default)]
    starred_sessions: BTreeMap<SessionId, Timestamp>,
    #[serde(default)]
    viewed_videos: BTreeSet<VideoId>,
    #[serde(default)]
    feedback_submitted_sessions: BTreeSet<SessionId>,
    #[serde(default)]
    push_key: String,
}

impl From<&UserDataSnapshot> for SnapshotWire {
    fn from(snapshot: &UserDataSnapshot) -> Self {
        Self {
            starred_sessions: snapshot.starred_sessions.clone(),
            viewed_videos: snapshot.viewed_videos.clone(),
            feedback_submitted_sessions: snapshot.feedback_submitted.clone(),
            push_key: snapshot.push_key.clone(),
        }
    }
}

impl From<SnapshotWire> for UserDataSnapshot {
    fn from(wire: SnapshotWire) -> Self {
        Self {
            starred_sessions: wire.starred_sessions,
            viewed_videos: wire.viewed_videos,
            feedback_submitted: wire.feedback_submitted_sessions,
            push_key: wire.push_key,
        }
    }
}

/// Encodes a snapshot as a JSON string
pub fn to_json_string(snapshot: &UserDataSnapshot) -> SyncResult<String> {
    Ok(serde_json::to_string(&SnapshotWire::from(snapshot))?)
}

/// Decodes a snapshot from a JSON string
///
/// An empty or whitespace-only input decodes to an empty snapshot, matching
/// the behavior expected from a store that has never been written.
pub fn from_json_str(input: &str) -> SyncResult<UserDataSnapshot> {
    if input.trim().is_empty() {
        return Ok(UserDataSnapshot::new());
    }
    let wire: SnapshotWire = serde_json::from_str(input)?;
    Ok(wire.into())
}
