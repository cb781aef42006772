// crates/network/src/registration.rs
//! Push-registration client
//!
//! Pairs a device with a user on the push server so other devices can be
//! nudged when this one changes user data. Registration retries with
//! exponential backoff since the server might be down when the app starts;
//! unregistration is best-effort: a device left registered only costs the
//! server one "not registered" response on its next send.

use crate::error::{NetworkError, NetworkResult};
use std::time::Duration;
use summit_core::{AccountId, DeviceId, Timestamp};
use summit_resilience::{with_retry, ResilienceError, RetryPolicy};

/// Push server configuration
#[derive(Debug, Clone, Default)]
pub struct PushConfig {
    /// Push server base URL; empty disables the feature
    pub server_url: String,
    /// API key sent with privileged endpoints; empty disables the feature
    pub api_key: String,
}

impl PushConfig {
    /// Creates a configuration
    pub fn new(server_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Returns an error describing why the feature is disabled, if it is
    fn check_enabled(&self) -> NetworkResult<()> {
        if self.server_url.is_empty() {
            return Err(NetworkError::Disabled {
                reason: "no server URL configured".to_string(),
            });
        }
        if self.api_key.is_empty() {
            return Err(NetworkError::Disabled {
                reason: "no API key configured".to_string(),
            });
        }
        Ok(())
    }
}

/// A successful account/device registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub device_id: DeviceId,
    pub user_id: AccountId,
    pub registered_at: Timestamp,
}

/// Client for the push server's register/unregister contract
pub struct PushRegistrationClient {
    inner: reqwest::Client,
    config: PushConfig,
    policy: RetryPolicy,
}

impl PushRegistrationClient {
    /// Registration is retried up to this many times before giving up
    pub const MAX_ATTEMPTS: usize = 5;

    /// Base backoff delay between registration attempts
    pub const BACKOFF_BASE: Duration = Duration::from_secs(2);

    /// Creates a client with the standard retry policy
    pub fn new(config: PushConfig) -> NetworkResult<Self> {
        let policy = RetryPolicy::new(Self::MAX_ATTEMPTS)
            .with_initial_delay(Self::BACKOFF_BASE)
            .with_jitter(true);
        Self::with_policy(config, policy)
    }

    /// Creates a client with a custom retry policy
    pub fn with_policy(config: PushConfig, policy: RetryPolicy) -> NetworkResult<Self> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(NetworkError::Http)?;
        Ok(Self {
            inner,
            config,
            policy,
        })
    }

    /// Registers this account/device pair with the push server
    ///
    /// `push_key` is the opaque registration key that pairs the user with
    /// this device. Retries with exponential backoff until the attempt cap;
    /// dropping the returned future (owning context torn down) cancels the
    /// remaining retries. Exhausting the cap leaves the device unregistered,
    /// which is non-fatal: registration is silently retried on next app
    /// start.
    pub async fn register(
        &self,
        device_id: &DeviceId,
        user_id: &AccountId,
        push_key: &str,
    ) -> NetworkResult<Registration> {
        self.config.check_enabled()?;
        log::debug!("Registering device {} for {}", device_id, user_id);

        let result = with_retry(&self.policy, || {
            self.post(
                "register",
                &[
                    ("device_id", device_id.as_str()),
                    ("user_id", user_id.as_str()),
                    ("key", push_key),
                ],
            )
        })
        .await;

        match result {
            Ok(()) => {
                log::info!("Registered device {} on push server", device_id);
                Ok(Registration {
                    device_id: device_id.clone(),
                    user_id: user_id.clone(),
                    registered_at: Timestamp::now(),
                })
            }
            Err(ResilienceError::RetriesExhausted {
                attempts,
                last_error,
            }) => Err(NetworkError::RegistrationFailed {
                attempts,
                last_error,
            }),
            Err(e) => Err(NetworkError::Custom(e.to_string())),
        }
    }

    /// Unregisters this account/device pair, best-effort
    ///
    /// A failure is logged and swallowed: if the server later sends to the
    /// device it gets a "not registered" response and drops the pair itself.
    pub async fn unregister(&self, device_id: &DeviceId, user_id: &AccountId) {
        if self.config.check_enabled().is_err() {
            return;
        }
        log::debug!("Unregistering device {}", device_id);

        let result = self
            .post(
                "unregister",
                &[
                    ("device_id", device_id.as_str()),
                    ("user_id", user_id.as_str()),
                ],
            )
            .await;

        if let Err(e) = result {
            log::warn!("Unable to unregister from push server: {}", e);
        }
    }

    /// Asks the push server to nudge the user's other devices to sync
    ///
    /// Fired after a pass pushes changes remotely. Best-effort: the other
    /// devices also sync on their own schedule.
    pub async fn notify_user_data_changed(&self, user_id: &AccountId) {
        if self.config.check_enabled().is_err() {
            return;
        }
        log::debug!("Notifying push server that user data changed");

        let result = self
            .post("send/self/sync_user", &[("user_id", user_id.as_str())])
            .await;

        if let Err(e) = result {
            log::warn!("Unable to notify push server about user data change: {}", e);
        }
    }

    /// Form POST against a push server endpoint; success is HTTP 200
    async fn post(&self, endpoint: &str, params: &[(&str, &str)]) -> NetworkResult<()> {
        let url = format!(
            "{}/{}",
            self.config.server_url.trim_end_matches('/'),
            endpoint
        );

        let response = self
            .inner
            .post(&url)
            .header("Authorization", format!("key={}", self.config.api_key))
            .form(params)
            .send()
            .await
            .map_err(NetworkError::Http)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(NetworkError::Status {
                code: response.status().as_u16(),
            })
        }
    }
}
