//! Account-scoped query modules, one per logical bucket

pub mod feedback;
pub mod outbox;
pub mod prefs;
pub mod schedule;
pub mod videos;
