//! Per-account preference queries
//!
//! Holds the push-registration key that travels with the synchronized
//! snapshot, and the device-registration bookkeeping used to decide whether
//! a re-registration is due.

use crate::DbPool;
use sqlx::Row;
use summit_core::{AccountId, AppError, DeviceId, Timestamp};

/// A successful push registration for this account on this device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRecord {
    pub device_id: DeviceId,
    pub registered_at: Timestamp,
}

impl RegistrationRecord {
    /// Registrations older than this are refreshed on next app start
    pub const MAX_AGE_MILLIS: i64 = 24 * 60 * 60 * 1000;

    /// Returns true if the registration should be refreshed
    pub fn is_stale(&self, now: Timestamp) -> bool {
        self.registered_at.elapsed_millis(now) > Self::MAX_AGE_MILLIS
    }
}

/// Returns the account's push key, or an empty string if never set
pub async fn get_push_key(pool: &DbPool, account: &AccountId) -> Result<String, AppError> {
    let key: Option<String> =
        sqlx::query_scalar("SELECT push_key FROM account_prefs WHERE account_name = ?")
            .bind(account.as_str())
            .fetch_optional(pool)
            .await
            .map_err(|e| AppError::database("Failed to get push key", e))?;

    Ok(key.unwrap_or_default())
}

/// Stores the account's push key
pub async fn set_push_key(
    pool: &DbPool,
    account: &AccountId,
    push_key: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO account_prefs (account_name, push_key) VALUES (?, ?)
        ON CONFLICT (account_name) DO UPDATE SET push_key = excluded.push_key
        "#,
    )
    .bind(account.as_str())
    .bind(push_key)
    .execute(pool)
    .await
    .map_err(|e| AppError::database("Failed to set push key", e))?;

    Ok(())
}

/// Returns the device registration for an account, if one was recorded
pub async fn get_registration(
    pool: &DbPool,
    account: &AccountId,
) -> Result<Option<RegistrationRecord>, AppError> {
    let row = sqlx::query(
        "SELECT registered_device_id, registered_at FROM account_prefs WHERE account_name = ?",
    )
    .bind(account.as_str())
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::database("Failed to get registration", e))?;

    let Some(row) = row else {
        return Ok(None);
    };

    let device_id: Option<String> = row
        .try_get("registered_device_id")
        .map_err(|e| AppError::database("Missing device ID column", e))?;
    let registered_at: Option<i64> = row
        .try_get("registered_at")
        .map_err(|e| AppError::database("Missing registration timestamp column", e))?;

    match (device_id, registered_at) {
        (Some(device_id), Some(registered_at)) => Ok(Some(RegistrationRecord {
            device_id: DeviceId::new(device_id),
            registered_at: Timestamp::from_millis(registered_at),
        })),
        _ => Ok(None),
    }
}

/// Records a successful device registration
pub async fn set_registration(
    pool: &DbPool,
    account: &AccountId,
    record: &RegistrationRecord,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO account_prefs (account_name, registered_device_id, registered_at)
        VALUES (?, ?, ?)
        ON CONFLICT (account_name) DO UPDATE SET
            registered_device_id = excluded.registered_device_id,
            registered_at = excluded.registered_at
        "#,
    )
    .bind(account.as_str())
    .bind(record.device_id.as_str())
    .bind(record.registered_at.as_millis())
    .execute(pool)
    .await
    .map_err(|e| AppError::database("Failed to record registration", e))?;

    Ok(())
}

/// Clears the device registration after a successful unregister
pub async fn clear_registration(pool: &DbPool, account: &AccountId) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE account_prefs SET registered_device_id = NULL, registered_at = NULL
        WHERE account_name = ?
        "#,
    )
    .bind(account.as_str())
    .execute(pool)
    .await
    .map_err(|e| AppError::database("Failed to clear registration", e))?;

    Ok(())
}
