// FILE: crates/cli/src/commands.rs

use anyhow::{bail, Context, Result};
use console::style;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use summit_config::{Config, ConfigPersistence};
use summit_core::{AccountId, DeviceId, SessionId, Timestamp, UserAction, VideoId};
use summit_database::{
    connection::{connect, DatabaseConfig},
    queries::{outbox, prefs},
    run_migrations, DbPool, SqliteLocalStore,
};
use summit_network::{PushConfig, PushRegistrationClient};
use summit_remote::{RemoteConfig, RestRemoteStore};
use summit_sync_engine::SyncOrchestrator;

/// Everything a command needs: the loaded config, where it lives, and the
/// account being operated on
pub struct AppContext {
    pub config: Config,
    pub config_path: PathBuf,
    pub account: AccountId,
}

impl AppContext {
    /// Resolves the database path relative to the config directory
    pub fn database_path(&self) -> PathBuf {
        resolve_database_path(&self.config_path, &self.config.database.path)
    }
}

/// A relative database path lives next to the config file
fn resolve_database_path(config_path: &Path, database_path: &Path) -> PathBuf {
    if database_path.is_absolute() {
        database_path.to_path_buf()
    } else {
        config_path
            .parent()
            .map(|dir| dir.join(database_path))
            .unwrap_or_else(|| database_path.to_path_buf())
    }
}

/// Opens the database and brings the schema up to date
async fn open_database(ctx: &AppContext) -> Result<DbPool> {
    let path = ctx.database_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let config = DatabaseConfig::new(path.to_string_lossy());
    let pool = connect(config)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("Failed to apply database migrations")?;
    Ok(pool)
}

fn remote_store(ctx: &AppContext) -> Result<RestRemoteStore> {
    if !ctx.config.remote_enabled() {
        bail!("No remote replica configured. Add base URLs under [remote] in the config file.");
    }
    let config = RemoteConfig {
        base_urls: ctx.config.remote.base_urls.clone(),
        ..Default::default()
    };
    RestRemoteStore::new(config).context("Failed to create remote store")
}

fn push_client(ctx: &AppContext) -> Result<PushRegistrationClient> {
    let config = PushConfig::new(
        ctx.config.push.server_url.clone(),
        ctx.config.push.api_key.clone(),
    );
    PushRegistrationClient::new(config).context("Failed to create push client")
}

/// Initializes the database
pub async fn init(ctx: &AppContext) -> Result<()> {
    let pool = open_database(ctx).await?;
    summit_database::verify_integrity(&pool)
        .await
        .context("Database integrity check failed")?;
    println!(
        "{} Database ready at {}",
        style("✓").green().bold(),
        ctx.database_path().display()
    );
    Ok(())
}

/// Adds a session to the schedule
pub async fn star(ctx: &AppContext, session_id: &str) -> Result<()> {
    let action = UserAction::add_star(SessionId::new(session_id));
    record_action(ctx, action).await?;
    println!(
        "{} Added {} to your schedule",
        style("✓").green().bold(),
        style(session_id).cyan()
    );
    Ok(())
}

/// Removes a session from the schedule
pub async fn unstar(ctx: &AppContext, session_id: &str) -> Result<()> {
    let action = UserAction::remove_star(SessionId::new(session_id));
    record_action(ctx, action).await?;
    println!(
        "{} Removed {} from your schedule",
        style("✓").green().bold(),
        style(session_id).cyan()
    );
    Ok(())
}

/// Marks a video as watched
pub async fn viewed(ctx: &AppContext, video_id: &str) -> Result<()> {
    let action = UserAction::view_video(VideoId::new(video_id));
    record_action(ctx, action).await?;
    println!(
        "{} Marked video {} as watched",
        style("✓").green().bold(),
        style(video_id).cyan()
    );
    Ok(())
}

/// Records feedback submission for a session
pub async fn feedback(ctx: &AppContext, session_id: &str) -> Result<()> {
    let action = UserAction::submit_feedback(SessionId::new(session_id));
    record_action(ctx, action).await?;
    println!(
        "{} Recorded feedback for {}",
        style("✓").green().bold(),
        style(session_id).cyan()
    );
    Ok(())
}

/// Queues an action and applies it to the local store immediately
///
/// The local database always reflects local intent; the queued copy is what
/// the next sync pass reconciles with remote. With auto-sync on, a pass is
/// attempted right away, and a failure just leaves the action queued.
async fn record_action(ctx: &AppContext, action: UserAction) -> Result<()> {
    let pool = open_database(ctx).await?;
    let store = SqliteLocalStore::new(pool.clone());

    outbox::enqueue(&pool, &ctx.account, &action)
        .await
        .context("Failed to queue action")?;
    summit_sync_engine::LocalStore::replay(&store, &ctx.account, std::slice::from_ref(&action))
        .await
        .context("Failed to apply action locally")?;

    if ctx.config.sync.auto_sync && ctx.config.remote_enabled() {
        if let Err(e) = sync_once(ctx, &pool, store).await {
            log::warn!("Auto-sync failed, action stays queued: {}", e);
        }
    }
    Ok(())
}

/// Runs one sync pass
pub async fn sync(ctx: &AppContext) -> Result<()> {
    let pool = open_database(ctx).await?;
    let store = SqliteLocalStore::new(pool.clone());
    let report = sync_once(ctx, &pool, store).await?;

    println!(
        "{} Sync complete: {} action(s) consumed, {} remote path(s) written",
        style("✓").green().bold(),
        report.actions_consumed,
        report.remote_writes
    );
    Ok(())
}

async fn sync_once(
    ctx: &AppContext,
    pool: &DbPool,
    store: SqliteLocalStore,
) -> Result<summit_sync_engine::SyncReport> {
    let remote = remote_store(ctx)?;
    let orchestrator =
        SyncOrchestrator::new(ctx.account.clone(), Arc::new(store), Arc::new(remote));

    // Load the durable outbox into this pass's queue
    let pending = outbox::load_pending(pool, &ctx.account)
        .await
        .context("Failed to load pending actions")?;
    let max_seq = pending.last().map(|(seq, _)| *seq);
    orchestrator
        .queue()
        .enqueue_all(pending.into_iter().map(|(_, action)| action))
        .context("Failed to queue pending actions")?;

    let report = orchestrator.sync().await.context("Sync pass failed")?;

    // The pass committed; drop the consumed outbox rows
    if let Some(seq) = max_seq {
        outbox::clear_through(pool, &ctx.account, seq)
            .await
            .context("Failed to clear consumed actions")?;
    }

    // Nudge the user's other devices if anything changed remotely
    if ctx.config.push_enabled() && report.remote_writes > 0 {
        push_client(ctx)?
            .notify_user_data_changed(&ctx.account)
            .await;
    }

    Ok(report)
}

/// Registers this device with the push server
pub async fn register(ctx: &mut AppContext) -> Result<()> {
    if ctx.config.device_id.is_empty() {
        ctx.config.device_id = DeviceId::generate().to_string();
        ConfigPersistence::new(ctx.config_path.clone())
            .save(&ctx.config)
            .context("Failed to save generated device ID")?;
    }
    let device_id = DeviceId::new(ctx.config.device_id.clone());

    let pool = open_database(ctx).await?;
    let mut push_key = prefs::get_push_key(&pool, &ctx.account)
        .await
        .context("Failed to read push key")?;
    if push_key.is_empty() {
        push_key = DeviceId::generate().to_string();
    }

    let client = push_client(ctx)?;
    let registration = client
        .register(&device_id, &ctx.account, &push_key)
        .await
        .context("Push registration failed")?;

    prefs::set_push_key(&pool, &ctx.account, &push_key)
        .await
        .context("Failed to store push key")?;
    prefs::set_registration(
        &pool,
        &ctx.account,
        &prefs::RegistrationRecord {
            device_id: registration.device_id,
            registered_at: registration.registered_at,
        },
    )
    .await
    .context("Failed to record registration")?;

    println!("{} Device registered for push sync", style("✓").green().bold());
    Ok(())
}

/// Unregisters this device from the push server, best-effort
pub async fn unregister(ctx: &AppContext) -> Result<()> {
    if ctx.config.device_id.is_empty() {
        bail!("This device was never registered");
    }
    let device_id = DeviceId::new(ctx.config.device_id.clone());

    push_client(ctx)?.unregister(&device_id, &ctx.account).await;

    let pool = open_database(ctx).await?;
    prefs::clear_registration(&pool, &ctx.account)
        .await
        .context("Failed to clear registration record")?;

    println!("{} Device unregistered", style("✓").green().bold());
    Ok(())
}

/// Prints the account's local state
pub async fn status(ctx: &AppContext, as_json: bool) -> Result<()> {
    let pool = open_database(ctx).await?;
    let store = SqliteLocalStore::new(pool.clone());

    let snapshot = summit_sync_engine::LocalStore::read(&store, &ctx.account)
        .await
        .context("Failed to read local data")?;

    if as_json {
        let json =
            summit_sync_engine::to_json_string(&snapshot).context("Failed to encode snapshot")?;
        println!("{}", json);
        return Ok(());
    }

    let pending = outbox::pending_count(&pool, &ctx.account)
        .await
        .context("Failed to count pending actions")?;
    let registration = prefs::get_registration(&pool, &ctx.account)
        .await
        .context("Failed to read registration")?;

    println!("\n{}", style(format!("Account {}", ctx.account)).bold());
    println!("{}", "=".repeat(60));
    println!("Starred sessions:    {}", snapshot.starred_sessions.len());
    for (session_id, timestamp) in &snapshot.starred_sessions {
        println!("  {} (updated {})", style(session_id).cyan(), timestamp);
    }
    println!("Viewed videos:       {}", snapshot.viewed_videos.len());
    println!("Feedback submitted:  {}", snapshot.feedback_submitted.len());
    println!("Pending actions:     {}", pending);
    match registration {
        Some(record) => {
            let staleness = if record.is_stale(Timestamp::now()) {
                style("stale").yellow().to_string()
            } else {
                style("fresh").green().to_string()
            };
            println!("Push registration:   {} ({})", record.device_id, staleness);
        }
        None => println!("Push registration:   {}", style("none").dim()),
    }
    Ok(())
}
