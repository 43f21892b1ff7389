//! Repository layer for family members.
//!
//! # Responsibility
//! - Define storage contracts used by services.
//! - Isolate SQLite query details from use-case orchestration.

pub mod person_repo;
