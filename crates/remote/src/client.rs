// crates/remote/src/client.rs
//! REST client for the remote user data tree
//!
//! Reads an account's whole subtree with one GET and pushes a write-set
//! with one PATCH against the account root, which the backing store applies
//! as an atomic multi-path update. Transient failures abort the sync pass;
//! the orchestrator retries on its next trigger, so no retry loop lives
//! here.

use crate::error::{RemoteError, RemoteResult};
use crate::tree;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use summit_core::{AccountId, UserDataSnapshot};
use summit_sync_engine::{RemoteStore, SyncResult, WriteSet};

/// Remote store configuration
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Replica base URLs; an account is pinned to one by hashing its id
    pub base_urls: Vec<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_urls: Vec::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RemoteConfig {
    /// Creates a configuration with a single replica URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_urls: vec![base_url.into()],
            ..Default::default()
        }
    }

    /// Sets the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP-backed remote store
#[derive(Clone)]
pub struct RestRemoteStore {
    inner: reqwest::Client,
    config: RemoteConfig,
}

impl RestRemoteStore {
    /// Creates a store from a configuration
    pub fn new(config: RemoteConfig) -> RemoteResult<Self> {
        if config.base_urls.is_empty() {
            return Err(RemoteError::NotConfigured);
        }
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RemoteError::Http)?;
        Ok(Self { inner, config })
    }

    /// Returns the replica URL an account is pinned to
    ///
    /// Accounts are spread across replicas by CRC32 of the account id, so an
    /// account always lands on the same replica from every device.
    pub fn url_for_account(&self, account: &AccountId) -> String {
        let index = crc32fast::hash(account.as_str().as_bytes()) as usize % self.config.base_urls.len();
        let base = self.config.base_urls[index].trim_end_matches('/');
        format!("{}/users/{}.json", base, account)
    }

    async fn read_tree(&self, account: &AccountId) -> RemoteResult<Value> {
        let url = self.url_for_account(account);
        log::debug!("Reading remote tree from {}", url);

        let response = self.inner.get(&url).send().await.map_err(RemoteError::Http)?;
        if !response.status().is_success() {
            return Err(RemoteError::Status {
                code: response.status().as_u16(),
            });
        }
        Ok(response.json().await.map_err(RemoteError::Http)?)
    }

    async fn patch_tree(&self, account: &AccountId, write_set: &WriteSet) -> RemoteResult<()> {
        let url = self.url_for_account(account);
        let body = tree::write_set_to_value(write_set);
        log::debug!("Patching {} path(s) at {}", write_set.len(), url);

        let response = self
            .inner
            .patch(&url)
            .json(&body)
            .send()
            .await
            .map_err(RemoteError::Http)?;
        if !response.status().is_success() {
            return Err(RemoteError::Status {
                code: response.status().as_u16(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for RestRemoteStore {
    async fn read(&self, account: &AccountId) -> SyncResult<UserDataSnapshot> {
        let value = self.read_tree(account).await?;
        Ok(tree::snapshot_from_tree(&value)?)
    }

    async fn apply_write_set(&self, account: &AccountId, write_set: &WriteSet) -> SyncResult<()> {
        if write_set.is_empty() {
            return Ok(());
        }
        Ok(self.patch_tree(account, write_set).await?)
    }
}
