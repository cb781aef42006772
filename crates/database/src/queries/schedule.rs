//! Starred-session ("my schedule") queries

use crate::DbPool;
use sqlx::Row;
use std::collections::BTreeMap;
use summit_core::{AccountId, AppError, SessionId, Timestamp};

/// Returns every starred session for an account with its star timestamp
pub async fn get_starred_sessions(
    pool: &DbPool,
    account: &AccountId,
) -> Result<BTreeMap<SessionId, Timestamp>, AppError> {
    let rows = sqlx::query(
        "SELECT session_id, starred_at FROM my_schedule WHERE account_name = ? ORDER BY session_id",
    )
    .bind(account.as_str())
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to get starred sessions", e))?;

    let mut sessions = BTreeMap::new();
    for row in rows {
        let session_id: String = row
            .try_get("session_id")
            .map_err(|e| AppError::database("Missing session ID", e))?;
        let starred_at: i64 = row
            .try_get("starred_at")
            .map_err(|e| AppError::database("Missing star timestamp", e))?;
        sessions.insert(SessionId::new(session_id), Timestamp::from_millis(starred_at));
    }
    Ok(sessions)
}

/// Returns true if the session is in the account's schedule
pub async fn is_starred(
    pool: &DbPool,
    account: &AccountId,
    session_id: &SessionId,
) -> Result<bool, AppError> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM my_schedule WHERE account_name = ? AND session_id = ?",
    )
    .bind(account.as_str())
    .bind(session_id.as_str())
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::database("Failed to check starred session", e))?;

    Ok(found.is_some())
}
