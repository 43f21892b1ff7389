//! GEDCOM 5.5 codec.
//!
//! # Responsibility
//! - Convert GEDCOM text into persons with parent links, and back.
//! - Bridge file-local `@xref@` pointers and stable person IDs.
//!
//! # Invariants
//! - The codec is synchronous and holds no shared state; parse and export
//!   may run concurrently on disjoint inputs.
//! - Neither direction fails on content: parse reports per-line diagnostics,
//!   export drops fields it cannot represent.
//! - Only NAME, SEX, BIRT/DEAT (DATE, PLAC), NOTE (CONT, CONC), FAMC/FAMS and
//!   FAM HUSB/WIFE/CHIL are interpreted; other tags are ignored.

pub mod date;
pub mod exporter;
pub mod line;
pub mod parser;

pub use date::{to_gedcom_date, to_iso_date};
pub use exporter::{build_family_groups, export_gedcom, FamilyGroup};
pub use line::{tokenize_line, GedcomLine};
pub use parser::{parse_gedcom, parse_gedcom_bytes, GedcomParser, ParseResult};
