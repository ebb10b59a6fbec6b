//! Inject pass: merge reviewed knowledge files into the catalog.
//!
//! Review batches are JSON arrays of entries keyed by exact heading
//! text, produced during manual review sessions. Their fields map onto
//! properties one-to-one; values update in place so a hand-ordered
//! drawer keeps its shape.

use super::RunOptions;
use crate::config::PropKeys;
use crate::document::{ensure_backup, load, write_atomic};
use crate::merge::{apply_update, MergeMode, PropertyUpdate};
use crate::{CinelogError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

const BACKUP_SUFFIX: &str = "bak";

/// One reviewed entry from a batch file.
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeEntry {
    /// Exact heading text this entry applies to.
    pub title: String,
    #[serde(default)]
    pub tmdb_id: Option<u64>,
    #[serde(default)]
    pub suggested_search: Option<String>,
    /// Corrected title, written as `AI_TITLE`.
    #[serde(default)]
    pub corrected: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl KnowledgeEntry {
    fn to_update(&self) -> PropertyUpdate {
        PropertyUpdate::new(MergeMode::InPlace)
            .set_opt(PropKeys::TMDB_ID, self.tmdb_id.map(|id| id.to_string()))
            .set_opt(PropKeys::SUGGESTED_SEARCH, self.suggested_search.clone())
            .set_opt(PropKeys::AI_TITLE, self.corrected.clone())
            .set_opt(PropKeys::YEAR, self.year.map(|y| y.to_string()))
            .set_opt(PropKeys::AI_NOTES, self.notes.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InjectStats {
    /// Entries loaded across all batch files.
    pub entries_loaded: usize,
    pub records_updated: usize,
    /// Knowledge entries whose heading was not found in the catalog.
    pub unmatched: usize,
}

/// Load every `batch*.json` in the directory, sorted by file name.
/// Later files win on duplicate headings.
pub fn load_batches(dir: &Path) -> Result<HashMap<String, KnowledgeEntry>> {
    if !dir.is_dir() {
        return Err(CinelogError::FileNotFound(dir.to_path_buf()));
    }

    let mut batch_paths: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| CinelogError::io_with_path(e, dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("batch") && n.ends_with(".json"))
        })
        .collect();
    batch_paths.sort();

    let mut knowledge = HashMap::new();
    let mut files = 0usize;
    for batch_path in &batch_paths {
        let text = std::fs::read_to_string(batch_path)
            .map_err(|e| CinelogError::io_with_path(e, batch_path))?;
        let entries: Vec<KnowledgeEntry> = serde_json::from_str(&text)?;
        debug!(
            "Loaded {} entries from {}",
            entries.len(),
            batch_path.display()
        );
        files += 1;
        for entry in entries {
            if !entry.title.is_empty() {
                knowledge.insert(entry.title.clone(), entry);
            }
        }
    }

    info!("Loaded {} entries from {} batch files", knowledge.len(), files);
    Ok(knowledge)
}

/// Run the inject pass: apply batch knowledge onto the catalog. No
/// network.
pub fn run_inject(path: &Path, batches_dir: &Path, options: &RunOptions) -> Result<InjectStats> {
    let knowledge = load_batches(batches_dir)?;
    let mut doc = load(path)?;

    let mut stats = InjectStats {
        entries_loaded: knowledge.len(),
        ..Default::default()
    };

    let mut seen = 0usize;
    for record in doc.records.iter_mut() {
        let Some(entry) = knowledge.get(&record.heading) else {
            continue;
        };
        seen += 1;

        if apply_update(record, &entry.to_update()) {
            debug!("Updated '{}'", record.heading);
            stats.records_updated += 1;
        }
    }
    stats.unmatched = knowledge.len() - seen.min(knowledge.len());

    if stats.records_updated > 0 && !options.dry_run {
        if options.backup {
            ensure_backup(path, BACKUP_SUFFIX)?;
        }
        write_atomic(path, &doc)?;
    }

    info!(
        "Inject done: {} records updated, {} knowledge entries unmatched",
        stats.records_updated, stats.unmatched
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_inject_pass_end_to_end() {
        let temp = TempDir::new().unwrap();
        let catalog = temp.path().join("review.org");
        std::fs::write(
            &catalog,
            "* Der Schimmelreiter\n:PROPERTIES:\n:NEEDS_REVIEW: true\n:END:\n* Other\n",
        )
        .unwrap();

        let batches = temp.path().join("batches");
        std::fs::create_dir(&batches).unwrap();
        std::fs::write(
            batches.join("batch001.json"),
            r#"[{"title": "Der Schimmelreiter", "tmdb_id": 55644, "corrected": "Der Schimmelreiter", "year": 1984, "notes": "TV adaptation"}]"#,
        )
        .unwrap();

        let stats = run_inject(&catalog, &batches, &RunOptions::default()).unwrap();
        assert_eq!(stats.entries_loaded, 1);
        assert_eq!(stats.records_updated, 1);
        assert_eq!(stats.unmatched, 0);

        let doc = crate::document::load(&catalog).unwrap();
        let record = &doc.records[0];
        assert_eq!(record.prop("TMDB_ID"), Some("55644"));
        assert_eq!(record.prop("AI_TITLE"), Some("Der Schimmelreiter"));
        assert_eq!(record.prop("YEAR"), Some("1984"));
        assert_eq!(record.prop("AI_NOTES"), Some("TV adaptation"));
        // The untouched record is preserved.
        assert_eq!(doc.records[1].heading, "Other");
    }

    #[test]
    fn test_later_batch_files_win() {
        let temp = TempDir::new().unwrap();
        let batches = temp.path().join("batches");
        std::fs::create_dir(&batches).unwrap();
        std::fs::write(
            batches.join("batch001.json"),
            r#"[{"title": "A", "year": 1990}]"#,
        )
        .unwrap();
        std::fs::write(
            batches.join("batch002.json"),
            r#"[{"title": "A", "year": 1991}]"#,
        )
        .unwrap();

        let knowledge = load_batches(&batches).unwrap();
        assert_eq!(knowledge.get("A").unwrap().year, Some(1991));
    }

    #[test]
    fn test_missing_batches_dir_is_fatal() {
        let temp = TempDir::new().unwrap();
        let err = load_batches(&temp.path().join("absent")).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_entries_without_new_values_change_nothing() {
        let temp = TempDir::new().unwrap();
        let catalog = temp.path().join("review.org");
        let text = "* A\n:PROPERTIES:\n:YEAR: 1990\n:END:\n";
        std::fs::write(&catalog, text).unwrap();

        let batches = temp.path().join("batches");
        std::fs::create_dir(&batches).unwrap();
        std::fs::write(batches.join("batch001.json"), r#"[{"title": "A"}]"#).unwrap();

        let stats = run_inject(&catalog, &batches, &RunOptions::default()).unwrap();
        assert_eq!(stats.records_updated, 0);
        assert_eq!(std::fs::read_to_string(&catalog).unwrap(), text);
    }
}
