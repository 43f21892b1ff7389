//! GEDCOM line tokenizer.
//!
//! Grammar: `<level> [<xref>] <tag> [<value>]`. The xref is only recognized in
//! second position and must be wrapped in `@…@`. Repeated delimiters before the
//! tag are tolerated. The value is everything after the single delimiter that
//! follows the tag and is never split further.

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// One tokenized GEDCOM record line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GedcomLine {
    pub level: u32,
    /// Cross-reference token including the surrounding `@`.
    pub xref: Option<String>,
    pub tag: String,
    pub value: Option<String>,
}

/// Tokenizes one physical line.
///
/// Returns `None` for blank lines and for lines that are not valid syntax
/// (non-numeric level, or fewer than two tokens). Callers distinguish the two
/// by checking for blank input first.
pub fn tokenize_line(line: &str) -> Option<GedcomLine> {
    let trimmed = line.trim_start_matches(BYTE_ORDER_MARK).trim();
    if trimmed.is_empty() {
        return None;
    }

    let (level_token, rest) = split_token(trimmed);
    let level = parse_level(level_token)?;
    // Runs of delimiters between level, xref and tag collapse.
    let rest = rest?.trim_start();

    let (second, after_second) = split_token(rest);
    if is_xref(second) {
        // A pointer without a tag still tokenizes; the record builder ignores it.
        let (tag, value) = match after_second {
            Some(remaining) => {
                let (tag, value) = split_token(remaining.trim_start());
                (tag.to_string(), value.and_then(non_empty))
            }
            None => (String::new(), None),
        };
        return Some(GedcomLine {
            level,
            xref: Some(second.to_string()),
            tag,
            value,
        });
    }

    Some(GedcomLine {
        level,
        xref: None,
        tag: second.to_string(),
        value: after_second.and_then(non_empty),
    })
}

/// Splits off the first token; the remainder drops exactly one delimiter.
fn split_token(input: &str) -> (&str, Option<&str>) {
    match input.find(char::is_whitespace) {
        Some(pos) => {
            let delimiter_len = input[pos..].chars().next().map_or(1, char::len_utf8);
            let remainder = &input[pos + delimiter_len..];
            (&input[..pos], Some(remainder))
        }
        None => (input, None),
    }
}

fn parse_level(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn is_xref(token: &str) -> bool {
    token.len() >= 2 && token.starts_with('@') && token.ends_with('@')
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::tokenize_line;

    #[test]
    fn tokenizes_record_with_xref() {
        let line = tokenize_line("0 @I1@ INDI").unwrap();
        assert_eq!(line.level, 0);
        assert_eq!(line.xref.as_deref(), Some("@I1@"));
        assert_eq!(line.tag, "INDI");
        assert_eq!(line.value, None);
    }

    #[test]
    fn keeps_value_as_single_field() {
        let line = tokenize_line("1 NAME John /Doe/").unwrap();
        assert_eq!(line.level, 1);
        assert_eq!(line.xref, None);
        assert_eq!(line.tag, "NAME");
        assert_eq!(line.value.as_deref(), Some("John /Doe/"));
    }

    #[test]
    fn tag_only_line_has_no_value() {
        let line = tokenize_line("1 BIRT").unwrap();
        assert_eq!(line.tag, "BIRT");
        assert_eq!(line.value, None);
    }

    #[test]
    fn strips_bom_and_surrounding_whitespace() {
        let line = tokenize_line("\u{FEFF}0 HEAD\r").unwrap();
        assert_eq!(line.level, 0);
        assert_eq!(line.tag, "HEAD");
    }

    #[test]
    fn value_keeps_inner_spacing_after_single_delimiter() {
        let line = tokenize_line("1 NAME  /张/").unwrap();
        assert_eq!(line.value.as_deref(), Some(" /张/"));
    }

    #[test]
    fn xref_record_can_carry_value() {
        let line = tokenize_line("0 @N1@ NOTE shared text").unwrap();
        assert_eq!(line.xref.as_deref(), Some("@N1@"));
        assert_eq!(line.tag, "NOTE");
        assert_eq!(line.value.as_deref(), Some("shared text"));
    }

    #[test]
    fn repeated_delimiters_before_tag_are_skipped() {
        let line = tokenize_line("0 @I1@  INDI").unwrap();
        assert_eq!(line.xref.as_deref(), Some("@I1@"));
        assert_eq!(line.tag, "INDI");

        let line = tokenize_line("1\t\tNAME  John /Doe/").unwrap();
        assert_eq!(line.level, 1);
        assert_eq!(line.tag, "NAME");
        assert_eq!(line.value.as_deref(), Some(" John /Doe/"));
    }

    #[test]
    fn rejects_invalid_lines() {
        assert_eq!(tokenize_line(""), None);
        assert_eq!(tokenize_line("   "), None);
        assert_eq!(tokenize_line("HEAD"), None);
        assert_eq!(tokenize_line("X NAME foo"), None);
        assert_eq!(tokenize_line("-1 NAME foo"), None);
        assert_eq!(tokenize_line("0"), None);
    }
}
