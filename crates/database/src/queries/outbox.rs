//! Durable pending-action outbox
//!
//! User actions are appended here the instant they happen, so a queue of
//! unsynced changes survives restarts. A sync pass loads the rows in user
//! order, and deletes exactly the rows it consumed once the pass commits; a
//! failed pass deletes nothing.

use crate::DbPool;
use sqlx::Row;
use summit_core::{AccountId, AppError, Timestamp, UserAction};

/// Appends an action to the account's outbox, returning its sequence number
pub async fn enqueue(
    pool: &DbPool,
    account: &AccountId,
    action: &UserAction,
) -> Result<i64, AppError> {
    let action_json = serde_json::to_string(action)
        .map_err(|e| AppError::database("Failed to encode action", e))?;

    let result = sqlx::query(
        "INSERT INTO pending_actions (account_name, action_json, created_at) VALUES (?, ?, ?)",
    )
    .bind(account.as_str())
    .bind(action_json)
    .bind(Timestamp::now().as_millis())
    .execute(pool)
    .await
    .map_err(|e| AppError::database("Failed to enqueue action", e))?;

    Ok(result.last_insert_rowid())
}

/// Loads every pending action for an account, oldest first
pub async fn load_pending(
    pool: &DbPool,
    account: &AccountId,
) -> Result<Vec<(i64, UserAction)>, AppError> {
    let rows = sqlx::query(
        "SELECT seq, action_json FROM pending_actions WHERE account_name = ? ORDER BY seq",
    )
    .bind(account.as_str())
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to load pending actions", e))?;

    let mut actions = Vec::with_capacity(rows.len());
    for row in rows {
        let seq: i64 = row
            .try_get("seq")
            .map_err(|e| AppError::database("Missing sequence number", e))?;
        let action_json: String = row
            .try_get("action_json")
            .map_err(|e| AppError::database("Missing action payload", e))?;
        let action: UserAction = serde_json::from_str(&action_json)
            .map_err(|e| AppError::database("Failed to decode action", e))?;
        actions.push((seq, action));
    }
    Ok(actions)
}

/// Deletes consumed actions up to and including a sequence number
pub async fn clear_through(
    pool: &DbPool,
    account: &AccountId,
    max_seq: i64,
) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM pending_actions WHERE account_name = ? AND seq <= ?")
        .bind(account.as_str())
        .bind(max_seq)
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to clear pending actions", e))?;

    Ok(result.rows_affected())
}

/// Returns the number of pending actions for an account
pub async fn pending_count(pool: &DbPool, account: &AccountId) -> Result<i64, AppError> {
    sqlx::query_scalar("SELECT COUNT(*) FROM pending_actions WHERE account_name = ?")
        .bind(account.as_str())
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::database("Failed to count pending actions", e))
}
