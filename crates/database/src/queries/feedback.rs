//! Feedback-submitted queries

use crate::DbPool;
use std::collections::BTreeSet;
use summit_core::{AccountId, AppError, SessionId};

/// Returns every session the account has submitted feedback for
pub async fn get_feedback_submitted(
    pool: &DbPool,
    account: &AccountId,
) -> Result<BTreeSet<SessionId>, AppError> {
    let ids: Vec<String> = sqlx::query_scalar(
        "SELECT session_id FROM feedback_submitted WHERE account_name = ? ORDER BY session_id",
    )
    .bind(account.as_str())
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to get feedback submissions", e))?;

    Ok(ids.into_iter().map(SessionId::new).collect())
}
