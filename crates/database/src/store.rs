//! SQLite-backed local store adapter
//!
//! Implements the sync engine's [`LocalStore`] boundary over the on-device
//! database. Writes and replays are single transactions: a failure rolls the
//! whole batch back, never leaving a partially-applied snapshot behind.

use crate::queries::{feedback, prefs, schedule, videos};
use crate::DbPool;
use async_trait::async_trait;
use summit_core::{AccountId, UserAction, UserActionKind, UserDataSnapshot};
use summit_sync_engine::{LocalStore, SyncError, SyncResult};

/// Local store over the SQLite user data buckets
#[derive(Clone)]
pub struct SqliteLocalStore {
    pool: DbPool,
}

impl SqliteLocalStore {
    /// Creates a store over an existing connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn storage_err(context: &str, e: impl std::fmt::Display) -> SyncError {
    SyncError::Storage(format!("{}: {}", context, e))
}

#[async_trait]
impl LocalStore for SqliteLocalStore {
    async fn read(&self, account: &AccountId) -> SyncResult<UserDataSnapshot> {
        let starred_sessions = schedule::get_starred_sessions(&self.pool, account)
            .await
            .map_err(|e| storage_err("read starred sessions", e))?;
        let viewed_videos = videos::get_viewed_videos(&self.pool, account)
            .await
            .map_err(|e| storage_err("read viewed videos", e))?;
        let feedback_submitted = feedback::get_feedback_submitted(&self.pool, account)
            .await
            .map_err(|e| storage_err("read feedback submissions", e))?;
        let push_key = prefs::get_push_key(&self.pool, account)
            .await
            .map_err(|e| storage_err("read push key", e))?;

        Ok(UserDataSnapshot {
            starred_sessions,
            viewed_videos,
            feedback_submitted,
            push_key,
        })
    }

    async fn write(&self, account: &AccountId, snapshot: &UserDataSnapshot) -> SyncResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_err("begin write transaction", e))?;

        // Clear-then-insert per bucket, scoped to the account
        sqlx::query("DELETE FROM my_schedule WHERE account_name = ?")
            .bind(account.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_err("clear schedule", e))?;
        for (session_id, timestamp) in &snapshot.starred_sessions {
            sqlx::query(
                "INSERT INTO my_schedule (account_name, session_id, starred_at) VALUES (?, ?, ?)",
            )
            .bind(account.as_str())
            .bind(session_id.as_str())
            .bind(timestamp.as_millis())
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_err("insert starred session", e))?;
        }

        sqlx::query("DELETE FROM viewed_videos WHERE account_name = ?")
            .bind(account.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_err("clear viewed videos", e))?;
        for video_id in &snapshot.viewed_videos {
            sqlx::query("INSERT INTO viewed_videos (account_name, video_id) VALUES (?, ?)")
                .bind(account.as_str())
                .bind(video_id.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| storage_err("insert viewed video", e))?;
        }

        sqlx::query("DELETE FROM feedback_submitted WHERE account_name = ?")
            .bind(account.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_err("clear feedback submissions", e))?;
        for session_id in &snapshot.feedback_submitted {
            sqlx::query("INSERT INTO feedback_submitted (account_name, session_id) VALUES (?, ?)")
                .bind(account.as_str())
                .bind(session_id.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| storage_err("insert feedback submission", e))?;
        }

        sqlx::query(
            r#"
            INSERT INTO account_prefs (account_name, push_key) VALUES (?, ?)
            ON CONFLICT (account_name) DO UPDATE SET push_key = excluded.push_key
            "#,
        )
        .bind(account.as_str())
        .bind(&snapshot.push_key)
        .execute(&mut *tx)
        .await
        .map_err(|e| storage_err("store push key", e))?;

        tx.commit()
            .await
            .map_err(|e| storage_err("commit write transaction", e))?;

        log::debug!(
            "Wrote snapshot for {}: {} starred, {} viewed, {} feedback",
            account,
            snapshot.starred_sessions.len(),
            snapshot.viewed_videos.len(),
            snapshot.feedback_submitted.len()
        );
        Ok(())
    }

    async fn replay(&self, account: &AccountId, actions: &[UserAction]) -> SyncResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_err("begin replay transaction", e))?;

        for action in actions {
            match &action.kind {
                UserActionKind::AddStar { session_id } => {
                    sqlx::query(
                        r#"
                        INSERT INTO my_schedule (account_name, session_id, starred_at)
                        VALUES (?, ?, ?)
                        ON CONFLICT (account_name, session_id)
                            DO UPDATE SET starred_at = excluded.starred_at
                        "#,
                    )
                    .bind(account.as_str())
                    .bind(session_id.as_str())
                    .bind(action.timestamp.as_millis())
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| storage_err("replay add star", e))?;
                }
                UserActionKind::RemoveStar { session_id } => {
                    sqlx::query(
                        "DELETE FROM my_schedule WHERE account_name = ? AND session_id = ?",
                    )
                    .bind(account.as_str())
                    .bind(session_id.as_str())
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| storage_err("replay remove star", e))?;
                }
                UserActionKind::ViewVideo { video_id } => {
                    sqlx::query(
                        r#"
                        INSERT INTO viewed_videos (account_name, video_id) VALUES (?, ?)
                        ON CONFLICT (account_name, video_id) DO NOTHING
                        "#,
                    )
                    .bind(account.as_str())
                    .bind(video_id.as_str())
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| storage_err("replay viewed video", e))?;
                }
                UserActionKind::SubmitFeedback { session_id } => {
                    sqlx::query(
                        r#"
                        INSERT INTO feedback_submitted (account_name, session_id) VALUES (?, ?)
                        ON CONFLICT (account_name, session_id) DO NOTHING
                        "#,
                    )
                    .bind(account.as_str())
                    .bind(session_id.as_str())
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| storage_err("replay feedback submission", e))?;
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| storage_err("commit replay transaction", e))?;

        log::debug!("Replayed {} action(s) for {}", actions.len(), account);
        Ok(())
    }
}
