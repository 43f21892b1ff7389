//! Core domain logic for the family tree app.
//! Owns the person model, the GEDCOM 5.5 codec and family storage.

pub mod db;
pub mod gedcom;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use gedcom::{
    build_family_groups, export_gedcom, parse_gedcom, parse_gedcom_bytes, to_gedcom_date,
    to_iso_date, tokenize_line, FamilyGroup, GedcomLine, GedcomParser, ParseResult,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::person::{Person, PersonId, PersonValidationError, Sex};
pub use model::person_id::{
    generate_person_id, generate_person_id_with, is_valid_person_id, PersonIdSource,
    RandomPersonIds, PERSON_ID_ALPHABET,
};
pub use repo::person_repo::{PersonRepository, RepoError, RepoResult, SqlitePersonRepository};
pub use service::gedcom_service::{GedcomService, GedcomServiceError};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
