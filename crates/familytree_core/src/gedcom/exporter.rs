//! GEDCOM 5.5 export.
//!
//! # Responsibility
//! - Serialize persons as INDI records with export-local `@I<k>@` xrefs.
//! - Rebuild FAM records from shared (father, mother) pairs.
//!
//! # Invariants
//! - Output is a pure function of the input order: `@I<k>@` follows person
//!   order and `@F<k>@` follows first appearance of each parent pair.
//! - Export never fails; dangling parent references only drop the matching
//!   HUSB/WIFE line.
//! - Sex is lossy: anything but `Sex::Female` is written as `M`.

use super::date::to_gedcom_date;
use crate::model::person::{Person, PersonId};
use indexmap::IndexMap;
use std::collections::HashMap;

const SOURCE_NAME: &str = "FamilyTree";
const GEDCOM_VERSION: &str = "5.5";
const GEDCOM_FORM: &str = "LINEAGE-LINKED";

/// Children sharing one exact (father, mother) pair.
///
/// Exists only while exporting. The key is compared as given: a person with
/// only a father set never groups with one that also has a mother.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyGroup {
    pub father_id: Option<PersonId>,
    pub mother_id: Option<PersonId>,
    /// Child IDs in person order.
    pub child_ids: Vec<PersonId>,
}

/// Groups persons with at least one parent by their exact parent pair.
///
/// Groups are ordered by first appearance, making FAM numbering stable.
pub fn build_family_groups(members: &[Person]) -> Vec<FamilyGroup> {
    let mut groups: IndexMap<(Option<&str>, Option<&str>), Vec<PersonId>> = IndexMap::new();

    for member in members.iter().filter(|member| member.has_parents()) {
        let key = (member.father_id.as_deref(), member.mother_id.as_deref());
        groups.entry(key).or_default().push(member.id.clone());
    }

    groups
        .into_iter()
        .map(|((father_id, mother_id), child_ids)| FamilyGroup {
            father_id: father_id.map(str::to_string),
            mother_id: mother_id.map(str::to_string),
            child_ids,
        })
        .collect()
}

/// Exports persons as a complete GEDCOM 5.5 document.
pub fn export_gedcom(members: &[Person]) -> String {
    let mut writer = GedcomWriter::default();
    writer.header();

    let xrefs: HashMap<&str, String> = members
        .iter()
        .enumerate()
        .map(|(index, member)| (member.id.as_str(), format!("@I{}@", index + 1)))
        .collect();
    let families = build_family_groups(members);
    let links = FamilyLinks::index(&families);

    for member in members {
        writer.individual(member, &xrefs, &links);
    }
    for (index, family) in families.iter().enumerate() {
        writer.family(index + 1, family, &xrefs);
    }

    writer.line(0, "TRLR", None);
    writer.finish()
}

/// Per-person FAMC/FAMS family numbers (1-based).
#[derive(Default)]
struct FamilyLinks<'a> {
    as_child: HashMap<&'a str, Vec<usize>>,
    as_spouse: HashMap<&'a str, Vec<usize>>,
}

impl<'a> FamilyLinks<'a> {
    fn index(families: &'a [FamilyGroup]) -> Self {
        let mut links = Self::default();
        for (index, family) in families.iter().enumerate() {
            let number = index + 1;
            for child in &family.child_ids {
                links.as_child.entry(child.as_str()).or_default().push(number);
            }

            let father = family.father_id.as_deref();
            let mother = family.mother_id.as_deref();
            for spouse in father.into_iter().chain(mother) {
                let numbers = links.as_spouse.entry(spouse).or_default();
                // Same person as both parents still gets one FAMS per family.
                if numbers.last() != Some(&number) {
                    numbers.push(number);
                }
            }
        }
        links
    }

    fn child_of(&self, id: &str) -> &[usize] {
        self.as_child.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn spouse_in(&self, id: &str) -> &[usize] {
        self.as_spouse.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Default)]
struct GedcomWriter {
    out: String,
}

impl GedcomWriter {
    /// `level` is a single digit (0..=2 here).
    fn line(&mut self, level: u8, tag: &str, value: Option<&str>) {
        self.out.push(char::from(b'0' + level));
        self.out.push(' ');
        self.out.push_str(tag);
        if let Some(value) = value {
            self.out.push(' ');
            self.out.push_str(value);
        }
        self.out.push('\n');
    }

    fn record(&mut self, xref: &str, tag: &str) {
        self.out.push_str("0 ");
        self.out.push_str(xref);
        self.out.push(' ');
        self.out.push_str(tag);
        self.out.push('\n');
    }

    fn header(&mut self) {
        self.line(0, "HEAD", None);
        self.line(1, "SOUR", Some(SOURCE_NAME));
        self.line(2, "VERS", Some(env!("CARGO_PKG_VERSION")));
        self.line(2, "NAME", Some(SOURCE_NAME));
        self.line(1, "DEST", Some("DISK"));
        self.line(1, "GEDC", None);
        self.line(2, "VERS", Some(GEDCOM_VERSION));
        self.line(2, "FORM", Some(GEDCOM_FORM));
        self.line(1, "CHAR", Some("UTF-8"));
    }

    fn individual(
        &mut self,
        member: &Person,
        xrefs: &HashMap<&str, String>,
        links: &FamilyLinks<'_>,
    ) {
        let Some(xref) = xrefs.get(member.id.as_str()) else {
            return;
        };

        self.record(xref, "INDI");
        let name = format!("{} /{}/", member.first_name, member.last_name);
        self.line(1, "NAME", Some(name.as_str()));
        self.line(2, "GIVN", Some(member.first_name.as_str()));
        self.line(2, "SURN", Some(member.last_name.as_str()));
        self.line(1, "SEX", Some(member.sex.gedcom_code()));

        self.event(
            "BIRT",
            member.birth_date.as_deref(),
            member.birth_place.as_deref(),
        );
        self.event(
            "DEAT",
            member.death_date.as_deref(),
            member.death_place.as_deref(),
        );

        for number in links.child_of(&member.id) {
            let pointer = format!("@F{number}@");
            self.line(1, "FAMC", Some(pointer.as_str()));
        }
        for number in links.spouse_in(&member.id) {
            let pointer = format!("@F{number}@");
            self.line(1, "FAMS", Some(pointer.as_str()));
        }

        if let Some(notes) = member.notes.as_deref() {
            let mut lines = notes.split('\n');
            if let Some(first) = lines.next() {
                self.line(1, "NOTE", Some(first));
            }
            for continuation in lines {
                self.line(2, "CONT", Some(continuation));
            }
        }
    }

    fn event(&mut self, tag: &str, date: Option<&str>, place: Option<&str>) {
        if date.is_none() && place.is_none() {
            return;
        }

        self.line(1, tag, None);
        if let Some(date) = date.and_then(to_gedcom_date) {
            self.line(2, "DATE", Some(date.as_str()));
        }
        if let Some(place) = place {
            self.line(2, "PLAC", Some(place));
        }
    }

    fn family(&mut self, number: usize, family: &FamilyGroup, xrefs: &HashMap<&str, String>) {
        self.record(&format!("@F{number}@"), "FAM");

        if let Some(husband) = resolve_xref(xrefs, family.father_id.as_deref()) {
            self.line(1, "HUSB", Some(husband));
        }
        if let Some(wife) = resolve_xref(xrefs, family.mother_id.as_deref()) {
            self.line(1, "WIFE", Some(wife));
        }
        for child in &family.child_ids {
            if let Some(child) = xrefs.get(child.as_str()) {
                self.line(1, "CHIL", Some(child.as_str()));
            }
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

fn resolve_xref<'x>(xrefs: &'x HashMap<&str, String>, id: Option<&str>) -> Option<&'x str> {
    id.and_then(|id| xrefs.get(id)).map(String::as_str)
}
