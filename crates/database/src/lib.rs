//! Summit Database Layer
//!
//! This crate provides the on-device store for synchronized user data.
//! It uses SQLite with sqlx and implements the sync engine's local store
//! boundary: bulk snapshot reads, transactional clear-then-insert writes
//! per bucket, and transactional replay of queued user actions.

pub mod connection;
pub mod migrations;
pub mod queries;
pub mod store;

pub use connection::DbPool;
pub use migrations::{current_version, run_migrations, verify_integrity};
pub use store::SqliteLocalStore;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::create_test_db;
    use crate::queries::outbox;
    use summit_core::{AccountId, SessionId, Timestamp, UserAction, VideoId};
    use summit_sync_engine::LocalStore;

    #[tokio::test]
    async fn test_full_local_workflow() {
        let pool = create_test_db().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let store = SqliteLocalStore::new(pool.clone());
        let account = AccountId::new("user@example.com");

        // The user stars a session and watches a video; both hit the outbox
        // and the local buckets immediately.
        let star =
            UserAction::add_star(SessionId::new("S9")).with_timestamp(Timestamp::from_millis(500));
        let view = UserAction::view_video(VideoId::new("V1"));

        let seq1 = outbox::enqueue(&pool, &account, &star).await.unwrap();
        let seq2 = outbox::enqueue(&pool, &account, &view).await.unwrap();
        store
            .replay(&account, &[star.clone(), view.clone()])
            .await
            .unwrap();

        let snapshot = store.read(&account).await.unwrap();
        assert!(snapshot.is_starred(&SessionId::new("S9")));
        assert!(snapshot.has_viewed(&VideoId::new("V1")));

        // A sync pass loads the pending batch in order and consumes it
        let pending = outbox::load_pending(&pool, &account).await.unwrap();
        assert_eq!(pending, vec![(seq1, star), (seq2, view)]);
        outbox::clear_through(&pool, &account, seq2).await.unwrap();
        assert_eq!(outbox::pending_count(&pool, &account).await.unwrap(), 0);
    }
}
