//! Viewed-video queries

use crate::DbPool;
use std::collections::BTreeSet;
use summit_core::{AccountId, AppError, VideoId};

/// Returns every video the account has watched
pub async fn get_viewed_videos(
    pool: &DbPool,
    account: &AccountId,
) -> Result<BTreeSet<VideoId>, AppError> {
    let ids: Vec<String> = sqlx::query_scalar(
        "SELECT video_id FROM viewed_videos WHERE account_name = ? ORDER BY video_id",
    )
    .bind(account.as_str())
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to get viewed videos", e))?;

    Ok(ids.into_iter().map(VideoId::new).collect())
}
