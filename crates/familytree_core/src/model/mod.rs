//! Domain model for family members.
//!
//! # Responsibility
//! - Define the person record shared by the GEDCOM codec and storage.
//! - Own identifier minting for persons.
//!
//! # Invariants
//! - Every person is identified by a stable `PersonId`.
//! - IDs are unique within any collection handed to the exporter.

pub mod person;
pub mod person_id;
