//! GEDCOM import/export use-cases.
//!
//! # Responsibility
//! - Parse GEDCOM input and persist every imported member.
//! - Export the stored family as GEDCOM text.
//!
//! # Invariants
//! - Each import mints fresh IDs; re-importing a file adds new members.
//! - Parse diagnostics never abort an import; they are returned to the caller.
//! - Members of one import are persisted atomically.
//! - A member recorded as its own parent is stored without that link; the
//!   dropped link is reported as a warning, never as an import failure.

use crate::gedcom::{export_gedcom, GedcomParser, ParseResult};
use crate::repo::person_repo::{PersonRepository, RepoError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead};
use std::time::Instant;

/// Service error for GEDCOM use-cases.
#[derive(Debug)]
pub enum GedcomServiceError {
    /// Reading the GEDCOM source failed.
    Io(io::Error),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for GedcomServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read GEDCOM input: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GedcomServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<io::Error> for GedcomServiceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<RepoError> for GedcomServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// GEDCOM facade over a person repository.
pub struct GedcomService<R: PersonRepository> {
    repo: R,
}

impl<R: PersonRepository> GedcomService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Imports GEDCOM text and persists the parsed members.
    pub fn import_str(&self, input: &str) -> Result<ParseResult, GedcomServiceError> {
        let parsed = GedcomParser::new().parse_str(input);
        self.persist(parsed)
    }

    /// Imports GEDCOM from a reader and persists the parsed members.
    pub fn import_reader<B: BufRead>(&self, reader: B) -> Result<ParseResult, GedcomServiceError> {
        let parsed = GedcomParser::new().parse_reader(reader).inspect_err(|err| {
            error!("event=gedcom_import module=service status=error error_code=read_failed error={err}");
        })?;
        self.persist(parsed)
    }

    /// Exports every stored member in storage order.
    pub fn export_all(&self) -> Result<String, GedcomServiceError> {
        let started_at = Instant::now();
        let members = self.repo.list_persons()?;
        let text = export_gedcom(&members);
        info!(
            "event=gedcom_export module=service status=ok duration_ms={} members={}",
            started_at.elapsed().as_millis(),
            members.len()
        );
        Ok(text)
    }

    /// Borrows the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn persist(&self, mut parsed: ParseResult) -> Result<ParseResult, GedcomServiceError> {
        let started_at = Instant::now();
        drop_self_parent_links(&mut parsed);
        match self.repo.upsert_persons(&parsed.members) {
            Ok(written) => {
                info!(
                    "event=gedcom_import module=service status=ok duration_ms={} members={} warnings={}",
                    started_at.elapsed().as_millis(),
                    written,
                    parsed.errors.len()
                );
                Ok(parsed)
            }
            Err(err) => {
                error!(
                    "event=gedcom_import module=service status=error error_code=persist_failed error={err}"
                );
                Err(err.into())
            }
        }
    }
}

/// Clears self-referencing parent slots and records one warning per member.
fn drop_self_parent_links(parsed: &mut ParseResult) {
    let mut dropped = 0usize;
    for member in &mut parsed.members {
        if member.drop_self_parent_links() {
            dropped += 1;
            parsed
                .errors
                .push(format!("person {}: self-parent link dropped", member.id));
        }
    }
    if dropped > 0 {
        warn!("event=gedcom_import module=service status=self_parent_dropped count={dropped}");
    }
}
