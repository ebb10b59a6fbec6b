//! Permissive line scanner for org-mode catalog files.
//!
//! The corpus is hand-edited text, so nothing here is fatal: lines that
//! do not match the expected shapes are kept verbatim and simply not
//! indexed. The scanner only commits to three shapes: a `* ` heading,
//! the exact `:PROPERTIES:` / `:END:` marker lines, and `:KEY: value`
//! entries between them.

use super::{OrgDocument, Property, PropertyBlock, Record};
use regex::Regex;
use std::sync::LazyLock;

/// Marker opening a property drawer (compared against the trimmed line).
pub const PROPERTIES_START: &str = ":PROPERTIES:";

/// Marker closing a property drawer.
pub const PROPERTIES_END: &str = ":END:";

/// Regex for `:KEY: value` property entries.
static PROPERTY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([^:]+):\s*(.*)$").unwrap());

/// Parse a document into its segment arena.
///
/// A line starting with `* ` opens a new record and closes the previous
/// one; end of input closes the last. Everything before the first
/// heading is preamble.
pub fn parse(text: &str) -> OrgDocument {
    let trailing_newline = text.ends_with('\n');
    let mut doc = OrgDocument {
        trailing_newline,
        ..Default::default()
    };

    let mut current: Option<Record> = None;

    for (idx, line) in text.lines().enumerate() {
        if let Some(heading) = line.strip_prefix("* ") {
            if let Some(mut record) = current.take() {
                record.block = scan_block(&record.lines);
                doc.records.push(record);
            }
            current = Some(Record {
                heading: heading.to_string(),
                start_line: idx + 1,
                lines: vec![line.to_string()],
                block: None,
            });
        } else if let Some(record) = current.as_mut() {
            record.lines.push(line.to_string());
        } else {
            doc.preamble.push(line.to_string());
        }
    }

    if let Some(mut record) = current.take() {
        record.block = scan_block(&record.lines);
        doc.records.push(record);
    }

    doc
}

/// Index the property drawer of a record segment, if it has one.
///
/// Returns `None` when no `:PROPERTIES:` line exists or it is never
/// closed by `:END:`. Within the block, `:KEY: value` lines with a
/// non-empty key are indexed; anything else is left alone. A repeated
/// key keeps the later occurrence and marks the earlier line as stale.
pub(crate) fn scan_block(lines: &[String]) -> Option<PropertyBlock> {
    let start = lines
        .iter()
        .position(|l| l.trim() == PROPERTIES_START)?;
    let end = lines[start + 1..]
        .iter()
        .position(|l| l.trim() == PROPERTIES_END)
        .map(|off| start + 1 + off)?;

    let mut block = PropertyBlock {
        start,
        end,
        ..Default::default()
    };

    for (idx, line) in lines[start + 1..end].iter().enumerate() {
        let line_idx = start + 1 + idx;
        let Some(caps) = PROPERTY_LINE.captures(line.trim()) else {
            continue;
        };
        let key = caps[1].trim().to_uppercase();
        if key.is_empty() {
            continue;
        }
        let value = caps[2].trim().to_string();

        if let Some(existing) = block.properties.iter().position(|p| p.key == key) {
            // Later occurrence wins; the earlier line is dropped from
            // rewritten output.
            let old = block.properties.remove(existing);
            block.stale.push(old.line);
        }
        block.properties.push(Property {
            key,
            value,
            line: line_idx,
        });
    }

    Some(block)
}
