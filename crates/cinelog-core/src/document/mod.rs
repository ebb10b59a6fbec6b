//! In-memory model of an org-mode catalog document.
//!
//! A parsed document is an arena of ordered line segments: a preamble
//! (anything before the first heading) followed by one segment per
//! record. Rewriting a record replaces its segment wholesale; line
//! indices of other segments are never touched, so edits that change a
//! record's line count cannot shift unrelated content.

pub mod parser;
pub mod writer;

pub use parser::parse;
pub use writer::{ensure_backup, load, write_atomic};

/// One `:KEY: value` entry inside a property block.
///
/// Keys are case-insensitive in the source file and stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub key: String,
    pub value: String,
    /// Local index of this entry's line within the record segment.
    pub line: usize,
}

/// A `:PROPERTIES:` .. `:END:` drawer, indexed but not copied: the
/// record segment keeps the raw lines, this struct only points into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyBlock {
    /// Local index of the `:PROPERTIES:` marker line.
    pub start: usize,
    /// Local index of the `:END:` marker line.
    pub end: usize,
    /// Indexed properties, in line order. Keys are unique; when the
    /// source contains a duplicate key the later occurrence is indexed
    /// and the earlier line lands in `stale`.
    pub properties: Vec<Property>,
    /// Local indices of superseded duplicate-key lines. These are
    /// dropped from any rewritten output (idempotent cleanup, not an
    /// error).
    pub stale: Vec<usize>,
}

/// One catalog entry: a heading line plus everything up to the next
/// heading (property drawer, body text, blank lines).
#[derive(Debug, Clone)]
pub struct Record {
    /// Heading text, without the `* ` marker.
    pub heading: String,
    /// 1-based line number of the heading at parse time (reporting only;
    /// it is not updated when earlier records change length).
    pub start_line: usize,
    /// Full segment, heading line included, without line terminators.
    pub lines: Vec<String>,
    /// Indexed property drawer, if the record has one.
    pub block: Option<PropertyBlock>,
}

impl Record {
    /// Look up a property value by case-insensitive key.
    pub fn prop(&self, key: &str) -> Option<&str> {
        let key = key.to_uppercase();
        self.block
            .as_ref()?
            .properties
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// Whether the record carries the given property with a non-empty value.
    pub fn has_prop(&self, key: &str) -> bool {
        self.prop(key).is_some_and(|v| !v.trim().is_empty())
    }

    /// Whether a property equals the given value, case-insensitively.
    pub fn prop_is(&self, key: &str, value: &str) -> bool {
        self.prop(key)
            .is_some_and(|v| v.eq_ignore_ascii_case(value))
    }
}

/// A whole catalog file: preamble lines plus an ordered list of records.
#[derive(Debug, Clone, Default)]
pub struct OrgDocument {
    /// Lines before the first heading (often empty).
    pub preamble: Vec<String>,
    pub records: Vec<Record>,
    /// Whether the source file ended with a newline. Preserved on
    /// render so an untouched document round-trips byte-identically.
    pub trailing_newline: bool,
}

impl OrgDocument {
    /// Render the document back to text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let lines = self
            .preamble
            .iter()
            .chain(self.records.iter().flat_map(|r| r.lines.iter()));
        let mut first = true;
        for line in lines {
            if !first {
                out.push('\n');
            }
            out.push_str(line);
            first = false;
        }
        if self.trailing_newline && !first {
            out.push('\n');
        }
        out
    }

    /// Total number of lines currently held.
    pub fn line_count(&self) -> usize {
        self.preamble.len() + self.records.iter().map(|r| r.lines.len()).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
#+TITLE: TV Liste

* Heat (1995)
:PROPERTIES:
:TMDB_ID: 949
:END:
Great film.

* Unbekannter Film
";

    #[test]
    fn test_render_roundtrip() {
        let doc = parse(SAMPLE);
        assert_eq!(doc.render(), SAMPLE);
    }

    #[test]
    fn test_prop_lookup_is_case_insensitive() {
        let doc = parse(SAMPLE);
        let record = &doc.records[0];
        assert_eq!(record.prop("tmdb_id"), Some("949"));
        assert!(record.has_prop("TMDB_ID"));
        assert!(!record.has_prop("NEEDS_REVIEW"));
    }

    #[test]
    fn test_prop_is_ignores_value_case() {
        let text = "* A\n:PROPERTIES:\n:AI_VERIFIED: True\n:END:\n";
        let doc = parse(text);
        assert!(doc.records[0].prop_is("AI_VERIFIED", "true"));
    }
}
