//! Identifier newtypes
//!
//! Session, video and account identifiers are opaque strings assigned by the
//! conference backend; device identifiers are generated locally.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a conference session
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session ID from a string
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the session ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Unique identifier for a session recording in the video library
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Creates a video ID from a string
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the video ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier for a signed-in user account
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Creates an account ID from a string
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the account ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Unique device identifier, generated once per installation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Generates a new random device ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates a device ID from a previously stored string
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the device ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
