//! GEDCOM 5.5 import.
//!
//! # Responsibility
//! - Fold tokenized lines into per-xref individual and family accumulators.
//! - Resolve parentage from FAM records and remap file-local xrefs to fresh
//!   person IDs.
//!
//! # Invariants
//! - Parsing never fails on content; malformed lines become diagnostics.
//! - FAM `HUSB`/`WIFE`/`CHIL` are the only source of parent links. Individual
//!   `FAMC`/`FAMS` pointers are collected but not used for linkage.
//! - Every parse mints new IDs; importing the same file twice yields
//!   distinct IDs.
//! - IDs are unique within one parse result; a repeated draw from the id
//!   source is discarded and redrawn.
//! - Xrefs are resolved after the full scan, so forward references work.

use super::date::to_iso_date;
use super::line::{tokenize_line, GedcomLine};
use crate::model::person::{Person, PersonId, Sex};
use crate::model::person_id::{PersonIdSource, RandomPersonIds};
use indexmap::IndexMap;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::io::{self, BufRead};
use std::time::Instant;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(.*?)\s*/(.+?)/(.*)").expect("valid gedcom name regex"));

/// Members and diagnostics produced by one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    /// Individuals in first-declaration order.
    pub members: Vec<Person>,
    /// `line <n>: invalid syntax: <text>` entries, in file order.
    pub errors: Vec<String>,
}

/// Parses GEDCOM text with randomly generated person IDs.
pub fn parse_gedcom(input: &str) -> ParseResult {
    GedcomParser::new().parse_str(input)
}

/// Parses GEDCOM bytes (UTF-8, invalid sequences replaced) with random IDs.
pub fn parse_gedcom_bytes(input: &[u8]) -> ParseResult {
    GedcomParser::new().parse_bytes(input)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum RecordKind {
    #[default]
    None,
    Individual,
    Family,
}

#[derive(Debug, Default)]
struct RawIndividual {
    given_name: Option<String>,
    surname: Option<String>,
    sex: Option<String>,
    birth_date: Option<String>,
    birth_place: Option<String>,
    death_date: Option<String>,
    death_place: Option<String>,
    note: Option<String>,
    // Only checked against declared families; parentage comes from FAM records.
    family_child_xrefs: Vec<String>,
    family_spouse_xrefs: Vec<String>,
}

#[derive(Debug, Default)]
struct RawFamily {
    husband_xref: Option<String>,
    wife_xref: Option<String>,
    child_xrefs: Vec<String>,
}

/// Single forward pass state over tokenized lines.
#[derive(Default)]
struct RecordBuilder {
    individuals: IndexMap<String, RawIndividual>,
    families: IndexMap<String, RawFamily>,
    current_xref: Option<String>,
    current_kind: RecordKind,
    current_subtag: Option<String>,
}

impl RecordBuilder {
    fn accept(&mut self, line: GedcomLine) {
        match line.level {
            0 => self.open_record(line),
            1 => {
                self.current_subtag = Some(line.tag.clone());
                match self.current_kind {
                    RecordKind::Individual => {
                        if let Some(indi) = self.current_individual() {
                            apply_individual_level1(indi, &line);
                        }
                    }
                    RecordKind::Family => {
                        if let Some(fam) = self.current_family() {
                            apply_family_level1(fam, &line);
                        }
                    }
                    RecordKind::None => {}
                }
            }
            2 => {
                if self.current_kind == RecordKind::Individual {
                    let parent_tag = self.current_subtag.clone();
                    if let Some(indi) = self.current_individual() {
                        apply_individual_level2(indi, &line, parent_tag.as_deref());
                    }
                }
            }
            _ => {}
        }
    }

    fn open_record(&mut self, line: GedcomLine) {
        self.current_xref = None;
        self.current_kind = RecordKind::None;
        self.current_subtag = None;

        let kind = match line.tag.as_str() {
            "INDI" => RecordKind::Individual,
            "FAM" => RecordKind::Family,
            _ => return,
        };
        let Some(xref) = line.xref else {
            return;
        };

        // A repeated xref restarts that record in place.
        match kind {
            RecordKind::Individual => {
                self.individuals
                    .insert(xref.clone(), RawIndividual::default());
            }
            RecordKind::Family => {
                self.families.insert(xref.clone(), RawFamily::default());
            }
            RecordKind::None => {}
        }
        self.current_xref = Some(xref);
        self.current_kind = kind;
    }

    fn current_individual(&mut self) -> Option<&mut RawIndividual> {
        let xref = self.current_xref.as_ref()?;
        self.individuals.get_mut(xref)
    }

    fn current_family(&mut self) -> Option<&mut RawFamily> {
        let xref = self.current_xref.as_ref()?;
        self.families.get_mut(xref)
    }
}

fn apply_individual_level1(indi: &mut RawIndividual, line: &GedcomLine) {
    match line.tag.as_str() {
        "NAME" => {
            if let Some(value) = line.value.as_deref() {
                apply_name(indi, value);
            }
        }
        "SEX" => indi.sex = trimmed(line.value.as_deref()),
        "NOTE" => indi.note = line.value.clone(),
        "FAMC" => {
            if let Some(xref) = trimmed(line.value.as_deref()) {
                indi.family_child_xrefs.push(xref);
            }
        }
        "FAMS" => {
            if let Some(xref) = trimmed(line.value.as_deref()) {
                indi.family_spouse_xrefs.push(xref);
            }
        }
        // BIRT/DEAT carry their data on level-2 lines.
        _ => {}
    }
}

/// Splits `<given> /<surname>/<suffix>`; without a slash-delimited surname the
/// whole value becomes the given name.
fn apply_name(indi: &mut RawIndividual, value: &str) {
    match NAME_RE.captures(value) {
        Some(caps) => {
            let given = caps[1].trim();
            let surname = caps[2].trim();
            if !given.is_empty() {
                indi.given_name = Some(given.to_string());
            }
            if !surname.is_empty() {
                indi.surname = Some(surname.to_string());
            }
        }
        None => indi.given_name = Some(value.trim().to_string()),
    }
}

fn apply_individual_level2(indi: &mut RawIndividual, line: &GedcomLine, parent_tag: Option<&str>) {
    let value = line.value.as_deref();
    match (parent_tag, line.tag.as_str()) {
        (Some("BIRT"), "DATE") => indi.birth_date = trimmed(value),
        (Some("BIRT"), "PLAC") => indi.birth_place = trimmed(value),
        (Some("DEAT"), "DATE") => indi.death_date = trimmed(value),
        (Some("DEAT"), "PLAC") => indi.death_place = trimmed(value),
        (Some("NAME"), "GIVN") => indi.given_name = trimmed(value),
        (Some("NAME"), "SURN") => indi.surname = trimmed(value),
        (Some("NOTE"), "CONT") => {
            let note = indi.note.get_or_insert_with(String::new);
            note.push('\n');
            note.push_str(value.unwrap_or_default());
        }
        (Some("NOTE"), "CONC") => {
            let note = indi.note.get_or_insert_with(String::new);
            note.push_str(value.unwrap_or_default());
        }
        _ => {}
    }
}

fn apply_family_level1(fam: &mut RawFamily, line: &GedcomLine) {
    let value = line.value.as_deref();
    match line.tag.as_str() {
        "HUSB" => fam.husband_xref = trimmed(value),
        "WIFE" => fam.wife_xref = trimmed(value),
        "CHIL" => {
            if let Some(xref) = trimmed(value) {
                fam.child_xrefs.push(xref);
            }
        }
        _ => {}
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(|text| text.trim().to_string())
}

/// Child xref -> (father xref, mother xref), each slot last-seen-wins
/// independently across families.
fn build_parent_map(
    families: &IndexMap<String, RawFamily>,
) -> HashMap<&str, (Option<&str>, Option<&str>)> {
    let mut parents: HashMap<&str, (Option<&str>, Option<&str>)> = HashMap::new();

    for family in families.values() {
        for child in &family.child_xrefs {
            let slot = parents.entry(child.as_str()).or_insert((None, None));
            if let Some(husband) = family.husband_xref.as_deref() {
                slot.0 = Some(husband);
            }
            if let Some(wife) = family.wife_xref.as_deref() {
                slot.1 = Some(wife);
            }
        }
    }

    parents
}

/// Counts individual FAMC/FAMS pointers naming a family that was never declared.
fn count_dangling_family_pointers(builder: &RecordBuilder) -> usize {
    builder
        .individuals
        .values()
        .flat_map(|indi| {
            indi.family_child_xrefs
                .iter()
                .chain(indi.family_spouse_xrefs.iter())
        })
        .filter(|xref| !builder.families.contains_key(xref.as_str()))
        .count()
}

/// GEDCOM importer parameterized by its person ID source.
pub struct GedcomParser<S: PersonIdSource = RandomPersonIds> {
    ids: S,
}

impl GedcomParser<RandomPersonIds> {
    /// Creates a parser minting random `XXXX-XXX` IDs.
    pub fn new() -> Self {
        Self {
            ids: RandomPersonIds::new(),
        }
    }
}

impl Default for GedcomParser<RandomPersonIds> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PersonIdSource> GedcomParser<S> {
    /// Creates a parser drawing person IDs from `ids`.
    pub fn with_id_source(ids: S) -> Self {
        Self { ids }
    }

    /// Parses GEDCOM text.
    pub fn parse_str(&mut self, input: &str) -> ParseResult {
        self.parse_lines(input.lines().map(str::to_owned))
    }

    /// Parses GEDCOM bytes; invalid UTF-8 is replaced, never rejected.
    pub fn parse_bytes(&mut self, input: &[u8]) -> ParseResult {
        self.parse_str(&String::from_utf8_lossy(input))
    }

    /// Parses GEDCOM from a buffered reader.
    ///
    /// # Errors
    /// - Returns transport errors raised by `reader`. Content problems never
    ///   produce an error.
    pub fn parse_reader<R: BufRead>(&mut self, mut reader: R) -> io::Result<ParseResult> {
        let mut lines = Vec::new();
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer)? == 0 {
                break;
            }
            let text = String::from_utf8_lossy(&buffer);
            lines.push(text.trim_end_matches(['\n', '\r']).to_string());
        }
        Ok(self.parse_lines(lines.into_iter()))
    }

    fn parse_lines(&mut self, lines: impl Iterator<Item = String>) -> ParseResult {
        let started_at = Instant::now();
        let mut builder = RecordBuilder::default();
        let mut errors = Vec::new();

        for (index, raw) in lines.enumerate() {
            let line_number = index + 1;
            let text = raw.trim_start_matches('\u{FEFF}').trim();
            if text.is_empty() {
                continue;
            }
            match tokenize_line(text) {
                Some(line) => builder.accept(line),
                None => {
                    warn!("event=gedcom_parse module=gedcom status=invalid_line line={line_number}");
                    errors.push(format!("line {line_number}: invalid syntax: {text}"));
                }
            }
        }

        let members = self.build_members(&builder);
        info!(
            "event=gedcom_parse module=gedcom status=ok duration_ms={} members={} families={} dangling_family_pointers={} errors={}",
            started_at.elapsed().as_millis(),
            members.len(),
            builder.families.len(),
            count_dangling_family_pointers(&builder),
            errors.len()
        );

        ParseResult { members, errors }
    }

    /// Draws from the id source until it yields an id not used in this parse.
    fn fresh_id(&mut self, minted: &mut HashSet<PersonId>) -> PersonId {
        loop {
            let id = self.ids.next_id();
            if minted.insert(id.clone()) {
                return id;
            }
            warn!("event=gedcom_parse module=gedcom status=id_collision");
        }
    }

    fn build_members(&mut self, builder: &RecordBuilder) -> Vec<Person> {
        let mut minted: HashSet<PersonId> = HashSet::with_capacity(builder.individuals.len());
        let xref_to_id: HashMap<&str, PersonId> = builder
            .individuals
            .keys()
            .map(|xref| (xref.as_str(), self.fresh_id(&mut minted)))
            .collect();
        let parents = build_parent_map(&builder.families);

        builder
            .individuals
            .iter()
            .map(|(xref, indi)| {
                let (father_xref, mother_xref) =
                    parents.get(xref.as_str()).copied().unwrap_or((None, None));
                let resolve = |parent: Option<&str>| {
                    parent.and_then(|parent| xref_to_id.get(parent).cloned())
                };

                Person {
                    id: xref_to_id[xref.as_str()].clone(),
                    last_name: indi.surname.clone().unwrap_or_default(),
                    first_name: indi.given_name.clone().unwrap_or_default(),
                    sex: indi
                        .sex
                        .as_deref()
                        .map(Sex::from_gedcom)
                        .unwrap_or_default(),
                    birth_date: indi.birth_date.as_deref().and_then(to_iso_date),
                    birth_place: indi.birth_place.clone(),
                    death_date: indi.death_date.as_deref().and_then(to_iso_date),
                    death_place: indi.death_place.clone(),
                    father_id: resolve(father_xref),
                    mother_id: resolve(mother_xref),
                    notes: indi.note.clone(),
                }
            })
            .collect()
    }
}
