//! Dedupe pass: offline duplicate-key cleanup.

use super::RunOptions;
use crate::document::{ensure_backup, load, write_atomic};
use crate::merge::dedupe_record;
use crate::Result;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

const BACKUP_SUFFIX: &str = "bak";

#[derive(Debug, Clone, Default)]
pub struct DedupeStats {
    pub total: usize,
    pub records_changed: usize,
    pub lines_removed: usize,
    /// Duplicates whose two values disagreed (later one kept).
    pub value_mismatches: usize,
    /// Removed duplicate lines per property key.
    pub by_key: BTreeMap<String, usize>,
}

/// Run the dedupe pass over a catalog file. No network.
pub fn run_dedupe(path: &Path, options: &RunOptions) -> Result<DedupeStats> {
    let mut doc = load(path)?;
    let mut stats = DedupeStats::default();

    for record in doc.records.iter_mut() {
        stats.total += 1;

        // Capture the superseded lines before they are dropped.
        if let Some(block) = &record.block {
            for &stale_idx in &block.stale {
                let Some((key, old_value)) = record.lines.get(stale_idx).and_then(|line| {
                    line.trim()
                        .strip_prefix(':')
                        .and_then(|rest| rest.split_once(':'))
                        .map(|(key, value)| (key.trim().to_uppercase(), value.trim().to_string()))
                }) else {
                    continue;
                };
                if let Some(kept) = record.prop(&key) {
                    if kept != old_value {
                        warn!(
                            "'{}': duplicate {} values differ, keeping '{}' over '{}'",
                            record.heading, key, kept, old_value
                        );
                        stats.value_mismatches += 1;
                    }
                }
                *stats.by_key.entry(key).or_insert(0) += 1;
            }
        }

        let removed = dedupe_record(record);
        if removed > 0 {
            debug!("'{}': removed {} duplicate lines", record.heading, removed);
            stats.records_changed += 1;
            stats.lines_removed += removed;
        }
    }

    if stats.records_changed > 0 && !options.dry_run {
        if options.backup {
            ensure_backup(path, BACKUP_SUFFIX)?;
        }
        write_atomic(path, &doc)?;
    }

    info!(
        "Dedupe done: {} records changed, {} lines removed",
        stats.records_changed, stats.lines_removed
    );
    Ok(stats)
}
