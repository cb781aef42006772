//! Domain types for Summit
//!
//! This module contains all domain models organized by responsibility:
//! - `ids`: identifier newtypes for sessions, videos, accounts and devices
//! - `user_action`: a single user-initiated change to the schedule
//! - `user_data`: the reconciled per-account user data snapshot
//! - `common`: shared utilities

mod common;
mod ids;
mod user_action;
mod user_data;

// Re-export all public types
pub use common::Timestamp;
pub use ids::{AccountId, DeviceId, SessionId, VideoId};
pub use user_action::{UserAction, UserActionKind};
pub use user_data::UserDataSnapshot;
