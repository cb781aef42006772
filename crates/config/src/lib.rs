//! Summit configuration
//!
//! TOML-backed application configuration: database location, remote replica
//! URLs, push server credentials and sync cadence. Files are written
//! atomically with a backup of the previous version kept alongside.

mod error;
mod persistence;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use persistence::ConfigPersistence;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Device identifier, generated on first run
    pub device_id: String,

    /// Account the app syncs for
    pub account: String,

    /// Local database settings
    pub database: DatabaseSection,

    /// Remote replica settings
    pub remote: RemoteSection,

    /// Push server settings
    pub push: PushSection,

    /// Sync cadence settings
    pub sync: SyncSection,
}

/// Local database settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseSection {
    /// Database file path (relative to the config dir if not absolute)
    pub path: PathBuf,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("summit.db"),
        }
    }
}

/// Remote replica settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteSection {
    /// Replica base URLs; accounts are pinned to one by hashing.
    /// Empty disables remote sync.
    pub base_urls: Vec<String>,
}

/// Push server settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PushSection {
    /// Push server base URL; empty disables push registration
    pub server_url: String,
    /// API key for privileged push endpoints
    pub api_key: String,
}

/// Sync cadence settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncSection {
    /// Minutes between periodic sync passes
    pub interval_minutes: u64,
    /// Whether to sync automatically after local changes
    pub auto_sync: bool,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            interval_minutes: 30,
            auto_sync: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            device_id: String::new(),
            account: String::new(),
            database: DatabaseSection::default(),
            remote: RemoteSection::default(),
            push: PushSection::default(),
            sync: SyncSection::default(),
        }
    }
}

impl Config {
    /// Validates the configuration and returns every problem found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.database.path.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "database.path",
                "must not be empty",
            ));
        }

        if self.sync.interval_minutes < 1 || self.sync.interval_minutes > 1440 {
            errors.push(ValidationError::new(
                "sync.interval_minutes",
                "must be between 1 and 1440",
            ));
        }

        for url in &self.remote.base_urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                errors.push(ValidationError::new(
                    "remote.base_urls",
                    format!("'{}' is not an http(s) URL", url),
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Returns true if remote sync is configured
    pub fn remote_enabled(&self) -> bool {
        !self.remote.base_urls.is_empty()
    }

    /// Returns true if push registration is configured
    pub fn push_enabled(&self) -> bool {
        !self.push.server_url.is_empty() && !self.push.api_key.is_empty()
    }
}

/// Returns the default config file path under the platform config directory
pub fn default_config_path() -> ConfigResult<PathBuf> {
    let dirs = directories::ProjectDirs::from("org", "summit", "summit").ok_or(
        ConfigError::PathResolutionError {
            reason: "no home directory available".to_string(),
        },
    )?;
    Ok(dirs.config_dir().join("config.toml"))
}
