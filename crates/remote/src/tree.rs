// crates/remote/src/tree.rs
//! Document tree encoding
//!
//! The remote replica is a JSON tree of flat boolean and integer leaves
//! under each account (see the sync engine's path scheme). This module is
//! the serialization boundary: it decodes a tree into a snapshot, encodes a
//! write-set into the multi-path update body, and can apply a write-set to
//! an in-memory tree the way the server does.

use crate::error::{RemoteError, RemoteResult};
use serde_json::{json, Map, Value};
use summit_core::{SessionId, Timestamp, UserDataSnapshot, VideoId};
use summit_sync_engine::paths::{
    FEEDBACK_SUBMITTED_NODE, IN_SCHEDULE_LEAF, PUSH_KEY_NODE, STARRED_SESSIONS_NODE,
    TIMESTAMP_LEAF, VIEWED_VIDEOS_NODE,
};
use summit_sync_engine::{WriteSet, WriteValue};

/// Decodes an account's document tree into a snapshot
///
/// A null tree (account never written) decodes to an empty snapshot.
/// Starred sessions whose in-schedule leaf is false are tombstones: they
/// stay in the remote tree for history but are absent from the snapshot.
pub fn snapshot_from_tree(tree: &Value) -> RemoteResult<UserDataSnapshot> {
    if tree.is_null() {
        return Ok(UserDataSnapshot::new());
    }
    let root = tree
        .as_object()
        .ok_or_else(|| RemoteError::InvalidTree("root is not an object".to_string()))?;

    let mut snapshot = UserDataSnapshot::new();

    if let Some(push_key) = root.get(PUSH_KEY_NODE) {
        snapshot.push_key = push_key.as_str().unwrap_or_default().to_string();
    }

    for video_id in marker_ids(root, VIEWED_VIDEOS_NODE)? {
        snapshot.viewed_videos.insert(VideoId::new(video_id));
    }

    for session_id in marker_ids(root, FEEDBACK_SUBMITTED_NODE)? {
        snapshot.feedback_submitted.insert(SessionId::new(session_id));
    }

    if let Some(starred) = root.get(STARRED_SESSIONS_NODE) {
        let starred = starred.as_object().ok_or_else(|| {
            RemoteError::InvalidTree(format!("{} is not an object", STARRED_SESSIONS_NODE))
        })?;
        for (session_id, node) in starred {
            let in_schedule = node
                .get(IN_SCHEDULE_LEAF)
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if !in_schedule {
                continue;
            }
            let timestamp = node
                .get(TIMESTAMP_LEAF)
                .and_then(Value::as_i64)
                .unwrap_or(0);
            snapshot.starred_sessions.insert(
                SessionId::new(session_id.clone()),
                Timestamp::from_millis(timestamp),
            );
        }
    }

    Ok(snapshot)
}

/// Collects the child ids of a true-marker subtree
fn marker_ids<'a>(root: &'a Map<String, Value>, node: &str) -> RemoteResult<Vec<&'a String>> {
    let Some(subtree) = root.get(node) else {
        return Ok(Vec::new());
    };
    let subtree = subtree
        .as_object()
        .ok_or_else(|| RemoteError::InvalidTree(format!("{} is not an object", node)))?;
    Ok(subtree
        .iter()
        .filter(|(_, marker)| marker.as_bool() == Some(true))
        .map(|(id, _)| id)
        .collect())
}

/// Encodes a write-set as the body of a multi-path update
///
/// Each key is a slash-separated path relative to the account root, exactly
/// as the server expects for a single atomic PATCH.
pub fn write_set_to_value(write_set: &WriteSet) -> Value {
    let mut body = Map::new();
    for (path, value) in write_set {
        body.insert(path.clone(), leaf_to_value(value));
    }
    Value::Object(body)
}

fn leaf_to_value(value: &WriteValue) -> Value {
    match value {
        WriteValue::Bool(b) => json!(b),
        WriteValue::Int(i) => json!(i),
        WriteValue::Text(s) => json!(s),
    }
}

/// Applies a write-set to an in-memory tree, all paths at once
///
/// Mirrors the server's multi-path update semantics: each path is split on
/// slashes, intermediate objects are created as needed, and the leaf value
/// is overwritten.
pub fn apply_write_set_to_tree(tree: &mut Value, write_set: &WriteSet) {
    if !tree.is_object() {
        *tree = Value::Object(Map::new());
    }
    let Some(root) = tree.as_object_mut() else {
        return;
    };
    for (path, value) in write_set {
        insert_at_path(root, path, leaf_to_value(value));
    }
}

/// Writes a value at a slash-separated path, creating intermediate objects
fn insert_at_path(map: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('/') {
        None => {
            map.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Some(child_map) = child.as_object_mut() {
                insert_at_path(child_map, rest, value);
            }
        }
    }
}
