//! Property merge and block rewriting.
//!
//! Applies new or corrected properties onto a record while leaving
//! everything it does not touch byte-identical: unrelated properties,
//! unindexed lines inside the drawer, body text. Two placement policies
//! exist because different workflows rely on each: review injection
//! updates values where they already stand, bulk enrichment appends its
//! fields in a declared order after the hand-maintained ones.

use crate::document::parser::{scan_block, PROPERTIES_END, PROPERTIES_START};
use crate::document::Record;

/// Placement policy for keys that already exist on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Overwrite the value on the key's original line.
    InPlace,
    /// Move new/changed keys after all existing entries, in the order
    /// they were declared on the update.
    Append,
}

/// A property value to be written.
///
/// Empty values (blank text, empty list) are omitted entirely rather
/// than serialized as blank property lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    List(Vec<String>),
}

impl PropertyValue {
    pub fn is_empty(&self) -> bool {
        match self {
            PropertyValue::Text(s) => s.trim().is_empty(),
            PropertyValue::List(items) => items.is_empty(),
        }
    }

    /// Serialized form: lists are comma-and-space joined.
    pub fn render(&self) -> String {
        match self {
            PropertyValue::Text(s) => s.trim().to_string(),
            PropertyValue::List(items) => items.join(", "),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(items: Vec<String>) -> Self {
        PropertyValue::List(items)
    }
}

/// A batch of property changes for one record.
#[derive(Debug, Clone)]
pub struct PropertyUpdate {
    mode: MergeMode,
    /// Keys to set, in declared order. Keys are uppercased on insert.
    set: Vec<(String, PropertyValue)>,
    /// Keys to delete outright (a consumed `SUGGESTED_SEARCH` hint).
    remove: Vec<String>,
}

impl PropertyUpdate {
    pub fn new(mode: MergeMode) -> Self {
        Self {
            mode,
            set: Vec::new(),
            remove: Vec::new(),
        }
    }

    /// Declare a key to set. Empty values are dropped here so callers
    /// can pass through whatever the API returned.
    pub fn set(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.set.push((key.to_uppercase(), value));
        }
        self
    }

    /// Declare a key to set only when a value is present.
    pub fn set_opt(self, key: &str, value: Option<impl Into<PropertyValue>>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    /// Declare a key to delete.
    pub fn remove(mut self, key: &str) -> Self {
        self.remove.push(key.to_uppercase());
        self
    }

    pub fn is_noop(&self) -> bool {
        self.set.is_empty() && self.remove.is_empty()
    }
}

/// Apply an update to a record, rewriting its property drawer.
///
/// Returns `true` when the record's lines changed. A record without a
/// drawer gets one inserted directly after the heading when the update
/// sets anything. Superseded duplicate-key lines are dropped from the
/// rewritten drawer as a side effect; a no-op update leaves the record
/// untouched, duplicates included.
pub fn apply_update(record: &mut Record, update: &PropertyUpdate) -> bool {
    if update.is_noop() {
        return false;
    }

    let new_lines = match &record.block {
        Some(block) => {
            let mut pending: Vec<(String, String)> = Vec::new();
            let mut out: Vec<String> = Vec::with_capacity(record.lines.len());

            for (idx, line) in record.lines.iter().enumerate() {
                let inside = idx > block.start && idx < block.end;

                if idx == block.end {
                    for (key, value) in update.set.iter() {
                        let exists_in_place = update.mode == MergeMode::InPlace
                            && block.properties.iter().any(|p| &p.key == key);
                        if !exists_in_place {
                            pending.push((key.clone(), value.render()));
                        }
                    }
                    for (key, value) in pending.drain(..) {
                        out.push(format!(":{}: {}", key, value));
                    }
                    out.push(line.clone());
                    continue;
                }

                if inside {
                    if block.stale.contains(&idx) {
                        continue;
                    }
                    if let Some(prop) = block.properties.iter().find(|p| p.line == idx) {
                        if update.remove.contains(&prop.key) {
                            continue;
                        }
                        if let Some((key, value)) =
                            update.set.iter().find(|(k, _)| k == &prop.key)
                        {
                            match update.mode {
                                MergeMode::InPlace => {
                                    out.push(format!(":{}: {}", key, value.render()));
                                }
                                // Re-appended before :END: in declared order.
                                MergeMode::Append => {}
                            }
                            continue;
                        }
                    }
                }

                out.push(line.clone());
            }

            out
        }
        None => {
            if update.set.is_empty() {
                return false;
            }
            let mut out = Vec::with_capacity(record.lines.len() + update.set.len() + 2);
            out.push(record.lines[0].clone());
            out.push(PROPERTIES_START.to_string());
            for (key, value) in update.set.iter() {
                out.push(format!(":{}: {}", key, value.render()));
            }
            out.push(PROPERTIES_END.to_string());
            out.extend(record.lines[1..].iter().cloned());
            out
        }
    };

    if new_lines == record.lines {
        return false;
    }
    record.lines = new_lines;
    record.block = scan_block(&record.lines);
    true
}

/// Drop superseded duplicate-key lines from a record's drawer.
///
/// Returns the number of lines removed. This is the offline cleanup
/// pass; [`apply_update`] performs the same cleanup whenever it rewrites
/// a drawer for other reasons.
pub fn dedupe_record(record: &mut Record) -> usize {
    let Some(block) = &record.block else {
        return 0;
    };
    if block.stale.is_empty() {
        return 0;
    }

    let stale = block.stale.clone();
    record.lines = record
        .lines
        .iter()
        .enumerate()
        .filter(|(idx, _)| !stale.contains(idx))
        .map(|(_, line)| line.clone())
        .collect();
    record.block = scan_block(&record.lines);
    stale.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse;

    fn record_from(text: &str) -> Record {
        parse(text).records.remove(0)
    }

    #[test]
    fn test_inplace_update_keeps_position() {
        let mut record =
            record_from("* A\n:PROPERTIES:\n:TMDB_ID: 1\n:GENRE: Drama\n:END:\n");
        let update = PropertyUpdate::new(MergeMode::InPlace).set("TMDB_ID", "42");

        assert!(apply_update(&mut record, &update));
        assert_eq!(
            record.lines,
            vec!["* A", ":PROPERTIES:", ":TMDB_ID: 42", ":GENRE: Drama", ":END:"]
        );
    }

    #[test]
    fn test_append_mode_moves_changed_keys_to_end() {
        let mut record =
            record_from("* A\n:PROPERTIES:\n:YEAR: 1990\n:GENRE: Drama\n:END:\n");
        let update = PropertyUpdate::new(MergeMode::Append)
            .set("YEAR", "1991")
            .set("RUNTIME", "120");

        assert!(apply_update(&mut record, &update));
        assert_eq!(
            record.lines,
            vec![
                "* A",
                ":PROPERTIES:",
                ":GENRE: Drama",
                ":YEAR: 1991",
                ":RUNTIME: 120",
                ":END:"
            ]
        );
    }

    #[test]
    fn test_new_keys_append_before_end_in_declared_order() {
        let mut record = record_from("* A\n:PROPERTIES:\n:GENRE: Drama\n:END:\n");
        let update = PropertyUpdate::new(MergeMode::InPlace)
            .set("TMDB_ID", "949")
            .set("TMDB_TITLE", "Heat");

        apply_update(&mut record, &update);
        assert_eq!(
            record.lines,
            vec![
                "* A",
                ":PROPERTIES:",
                ":GENRE: Drama",
                ":TMDB_ID: 949",
                ":TMDB_TITLE: Heat",
                ":END:"
            ]
        );
    }

    #[test]
    fn test_block_created_when_missing() {
        let mut record = record_from("* A\nbody text\n");
        let update = PropertyUpdate::new(MergeMode::Append).set("TMDB_ID", "949");

        assert!(apply_update(&mut record, &update));
        assert_eq!(
            record.lines,
            vec!["* A", ":PROPERTIES:", ":TMDB_ID: 949", ":END:", "body text"]
        );
        assert_eq!(record.prop("TMDB_ID"), Some("949"));
    }

    #[test]
    fn test_empty_values_are_omitted() {
        let mut record = record_from("* A\n:PROPERTIES:\n:GENRE: Drama\n:END:\n");
        let update = PropertyUpdate::new(MergeMode::Append)
            .set("DIRECTOR", "")
            .set("ACTORS", Vec::<String>::new())
            .set("IMDB_ID", "tt0113277");

        apply_update(&mut record, &update);
        assert_eq!(
            record.lines,
            vec![
                "* A",
                ":PROPERTIES:",
                ":GENRE: Drama",
                ":IMDB_ID: tt0113277",
                ":END:"
            ]
        );
    }

    #[test]
    fn test_list_values_join_with_comma_space() {
        let mut record = record_from("* A\n:PROPERTIES:\n:END:\n");
        let update = PropertyUpdate::new(MergeMode::Append).set(
            "ACTORS",
            vec![
                "Al Pacino".to_string(),
                "Robert De Niro".to_string(),
                "Val Kilmer".to_string(),
            ],
        );

        apply_update(&mut record, &update);
        assert_eq!(
            record.prop("ACTORS"),
            Some("Al Pacino, Robert De Niro, Val Kilmer")
        );
    }

    #[test]
    fn test_remove_deletes_consumed_hint() {
        let mut record = record_from(
            "* A\n:PROPERTIES:\n:SUGGESTED_SEARCH: Heat 1995\n:YEAR: 1995\n:END:\n",
        );
        let update = PropertyUpdate::new(MergeMode::Append)
            .set("TMDB_ID", "949")
            .remove("SUGGESTED_SEARCH");

        apply_update(&mut record, &update);
        assert_eq!(record.prop("SUGGESTED_SEARCH"), None);
        assert_eq!(record.prop("YEAR"), Some("1995"));
        assert_eq!(record.prop("TMDB_ID"), Some("949"));
    }

    #[test]
    fn test_noop_update_is_byte_identical() {
        let text = "* A\n:PROPERTIES:\nstray line\n:YEAR: 1999\n:END:\nbody\n";
        let mut record = record_from(text);
        let before = record.lines.clone();

        assert!(!apply_update(&mut record, &PropertyUpdate::new(MergeMode::Append)));
        assert_eq!(record.lines, before);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut once = record_from("* A\n:PROPERTIES:\n:YEAR: 1990\n:END:\n");
        let update = PropertyUpdate::new(MergeMode::Append)
            .set("YEAR", "1991")
            .set("TMDB_ID", "7");

        apply_update(&mut once, &update);
        let after_once = once.lines.clone();
        // Second application of the same update changes nothing.
        assert!(!apply_update(&mut once, &update));
        assert_eq!(once.lines, after_once);
    }

    #[test]
    fn test_rewrite_drops_superseded_duplicate() {
        let mut record =
            record_from("* A\n:PROPERTIES:\n:YEAR: 1999\n:GENRE: Drama\n:YEAR: 2001\n:END:\n");
        let update = PropertyUpdate::new(MergeMode::Append).set("TMDB_ID", "7");

        apply_update(&mut record, &update);
        // Exactly one :YEAR: line survives, in the later line's position.
        assert_eq!(
            record.lines,
            vec![
                "* A",
                ":PROPERTIES:",
                ":GENRE: Drama",
                ":YEAR: 2001",
                ":TMDB_ID: 7",
                ":END:"
            ]
        );
    }

    #[test]
    fn test_dedupe_record() {
        let mut record =
            record_from("* A\n:PROPERTIES:\n:YEAR: 1999\n:YEAR: 2001\n:END:\n");
        assert_eq!(dedupe_record(&mut record), 1);
        assert_eq!(
            record.lines,
            vec!["* A", ":PROPERTIES:", ":YEAR: 2001", ":END:"]
        );
        // A second pass finds nothing.
        assert_eq!(dedupe_record(&mut record), 0);
    }

    #[test]
    fn test_unindexed_lines_survive_rewrites() {
        let mut record =
            record_from("* A\n:PROPERTIES:\n# reviewed by hand\n:YEAR: 1999\n:END:\n");
        let update = PropertyUpdate::new(MergeMode::Append).set("TMDB_ID", "7");

        apply_update(&mut record, &update);
        assert!(record.lines.contains(&"# reviewed by hand".to_string()));
    }
}
