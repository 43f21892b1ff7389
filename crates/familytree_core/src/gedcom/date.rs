//! Conversion between partial ISO dates and GEDCOM date text.
//!
//! | ISO          | GEDCOM        |
//! |--------------|---------------|
//! | `YYYY-MM-DD` | `D MON YYYY`  |
//! | `YYYY-MM`    | `MON YYYY`    |
//! | `YYYY`       | `YYYY`        |
//!
//! Both directions are total: blank input yields `None`, anything not in the
//! table (date ranges, qualifiers like `ABT`, bad months) is returned trimmed
//! and otherwise untouched. Digits are ASCII only.

use once_cell::sync::Lazy;
use regex::Regex;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

static ISO_FULL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("valid iso full date regex"));
static ISO_MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})$").expect("valid iso month regex"));
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}$").expect("valid year regex"));
static GEDCOM_FULL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{1,2})\s+([A-Za-z]{3})\s+([0-9]{4})$").expect("valid gedcom full date regex")
});
static GEDCOM_MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]{3})\s+([0-9]{4})$").expect("valid gedcom month regex")
});

/// Converts a partial ISO date to GEDCOM date text.
pub fn to_gedcom_date(iso: &str) -> Option<String> {
    let trimmed = iso.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(caps) = ISO_FULL_RE.captures(trimmed) {
        let (Some(month), Ok(day)) = (month_abbreviation(&caps[2]), caps[3].parse::<u32>())
        else {
            return Some(trimmed.to_string());
        };
        return Some(format!("{day} {month} {}", &caps[1]));
    }

    if let Some(caps) = ISO_MONTH_RE.captures(trimmed) {
        let Some(month) = month_abbreviation(&caps[2]) else {
            return Some(trimmed.to_string());
        };
        return Some(format!("{month} {}", &caps[1]));
    }

    Some(trimmed.to_string())
}

/// Converts GEDCOM date text to a partial ISO date.
pub fn to_iso_date(gedcom: &str) -> Option<String> {
    let trimmed = gedcom.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(caps) = GEDCOM_FULL_RE.captures(trimmed) {
        let Some(month) = month_number(&caps[2]) else {
            return Some(trimmed.to_string());
        };
        return Some(format!("{}-{month:02}-{:0>2}", &caps[3], &caps[1]));
    }

    if let Some(caps) = GEDCOM_MONTH_RE.captures(trimmed) {
        let Some(month) = month_number(&caps[1]) else {
            return Some(trimmed.to_string());
        };
        return Some(format!("{}-{month:02}", &caps[2]));
    }

    // Bare years and unrecognized text both pass through unchanged.
    Some(trimmed.to_string())
}

/// Returns whether `value` is one of the canonical partial ISO forms with a
/// valid month.
pub fn is_canonical_partial_date(value: &str) -> bool {
    if YEAR_RE.is_match(value) {
        return true;
    }
    if let Some(caps) = ISO_MONTH_RE.captures(value) {
        return month_abbreviation(&caps[2]).is_some();
    }
    if let Some(caps) = ISO_FULL_RE.captures(value) {
        return month_abbreviation(&caps[2]).is_some();
    }
    false
}

fn month_abbreviation(month_digits: &str) -> Option<&'static str> {
    let month: usize = month_digits.parse().ok()?;
    month
        .checked_sub(1)
        .and_then(|index| MONTH_ABBREVIATIONS.get(index))
        .copied()
}

fn month_number(abbreviation: &str) -> Option<usize> {
    let upper = abbreviation.to_ascii_uppercase();
    MONTH_ABBREVIATIONS
        .iter()
        .position(|candidate| *candidate == upper)
        .map(|index| index + 1)
}
