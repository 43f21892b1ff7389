//! Person domain model.
//!
//! # Responsibility
//! - Define the canonical family member record exchanged with GEDCOM and storage.
//! - Provide the binary sex mapping shared by import and export.
//!
//! # Invariants
//! - `id` is assigned once and never changes or gets reused.
//! - `birth_date` / `death_date` use partial ISO form `YYYY`, `YYYY-MM` or
//!   `YYYY-MM-DD` when produced by the codec; other text is carried verbatim.
//! - `death_date == None` means living or unknown, never "dead".
//! - Parent references may dangle; readers treat them as unknown parents.

use super::person_id::generate_person_id;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier of a person (`XXXX-XXX` when minted by this crate).
///
/// Kept as a type alias: imported data may carry any opaque string.
pub type PersonId = String;

/// Sex as representable in GEDCOM 5.5 (`M` / `F`).
///
/// GEDCOM 5.5 only knows two values, so unknown input collapses to `Male`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl Sex {
    /// Maps a raw GEDCOM `SEX` value; anything but `F` (any case) is male.
    pub fn from_gedcom(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "F" => Self::Female,
            _ => Self::Male,
        }
    }

    /// GEDCOM `SEX` code for this value.
    pub fn gedcom_code(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }

    /// Storage/wire name (`male` / `female`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// Parses a storage/wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }
}

/// Canonical family member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    /// Surname; may be empty.
    pub last_name: String,
    /// Given name; may be empty.
    pub first_name: String,
    #[serde(default)]
    pub sex: Sex,
    pub birth_date: Option<String>,
    pub birth_place: Option<String>,
    pub death_date: Option<String>,
    pub death_place: Option<String>,
    pub father_id: Option<PersonId>,
    pub mother_id: Option<PersonId>,
    /// Free text, may contain `\n`.
    pub notes: Option<String>,
}

impl Person {
    /// Creates a person with the given identity and no optional data.
    pub fn new(
        id: impl Into<PersonId>,
        last_name: impl Into<String>,
        first_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            last_name: last_name.into(),
            first_name: first_name.into(),
            sex: Sex::Male,
            birth_date: None,
            birth_place: None,
            death_date: None,
            death_place: None,
            father_id: None,
            mother_id: None,
            notes: None,
        }
    }

    /// Creates a person with a freshly generated ID.
    pub fn with_generated_id(last_name: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self::new(generate_person_id(), last_name, first_name)
    }

    /// Display name: surname followed by given name, no separator.
    pub fn full_name(&self) -> String {
        format!("{}{}", self.last_name, self.first_name)
    }

    /// Returns whether either parent reference is set.
    pub fn has_parents(&self) -> bool {
        self.father_id.is_some() || self.mother_id.is_some()
    }

    /// Clears any parent slot pointing back at this person.
    ///
    /// Returns whether a link was dropped.
    pub fn drop_self_parent_links(&mut self) -> bool {
        let mut dropped = false;
        for slot in [&mut self.father_id, &mut self.mother_id] {
            if slot.as_deref() == Some(self.id.as_str()) {
                *slot = None;
                dropped = true;
            }
        }
        dropped
    }

    /// Validates invariants enforced before persistence.
    ///
    /// The GEDCOM codec does not call this; it tolerates any record.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        if self.id.trim().is_empty() {
            return Err(PersonValidationError::EmptyId);
        }
        if self.father_id.as_deref() == Some(self.id.as_str())
            || self.mother_id.as_deref() == Some(self.id.as_str())
        {
            return Err(PersonValidationError::SelfParent(self.id.clone()));
        }
        Ok(())
    }
}

/// Validation failures for [`Person`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonValidationError {
    EmptyId,
    SelfParent(PersonId),
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "person id cannot be empty"),
            Self::SelfParent(id) => write!(f, "person {id} cannot be its own parent"),
        }
    }
}

impl Error for PersonValidationError {}
