//! Atomic persistence for catalog documents.
//!
//! Writes go to a pid-suffixed temp file in the target directory, are
//! flushed and synced, then renamed into place, so an interrupted run
//! never leaves a half-written catalog at the canonical path. A
//! one-time backup of the pristine input is taken before the first
//! mutation of a run and never overwritten afterwards.

use super::OrgDocument;
use crate::{CinelogError, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info};

/// Persist the rendered document atomically at `path`.
pub fn write_atomic(path: &Path, doc: &OrgDocument) -> Result<()> {
    let temp_path = temp_path_for(path);

    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| CinelogError::Io {
                message: format!("Failed to create temp file {}", temp_path.display()),
                path: Some(temp_path.clone()),
                source: Some(e),
            })?;

        file.write_all(doc.render().as_bytes())
            .map_err(|e| CinelogError::Io {
                message: format!("Failed to write temp file {}", temp_path.display()),
                path: Some(temp_path.clone()),
                source: Some(e),
            })?;

        file.flush().map_err(|e| CinelogError::Io {
            message: format!("Failed to flush temp file {}", temp_path.display()),
            path: Some(temp_path.clone()),
            source: Some(e),
        })?;

        file.sync_all().map_err(|e| CinelogError::Io {
            message: format!("Failed to sync temp file {}", temp_path.display()),
            path: Some(temp_path.clone()),
            source: Some(e),
        })?;
    }

    fs::rename(&temp_path, path).map_err(|e| CinelogError::Io {
        message: format!(
            "Failed to rename {} to {}",
            temp_path.display(),
            path.display()
        ),
        path: Some(path.to_path_buf()),
        source: Some(e),
    })?;

    debug!("Atomically wrote {}", path.display());
    Ok(())
}

/// Create `<path>.<suffix>` from the pristine input unless it already
/// exists. Returns `true` when a new backup was written.
///
/// The existence check is the gate that keeps a re-run of a partially
/// processed file from clobbering the original backup.
pub fn ensure_backup(path: &Path, suffix: &str) -> Result<bool> {
    let backup_path = backup_path_for(path, suffix);
    if backup_path.exists() {
        info!("Backup already exists: {}", backup_path.display());
        return Ok(false);
    }

    fs::copy(path, &backup_path).map_err(|e| CinelogError::Io {
        message: format!("Failed to create backup {}", backup_path.display()),
        path: Some(backup_path.clone()),
        source: Some(e),
    })?;
    info!("Backup created: {}", backup_path.display());
    Ok(true)
}

/// Read and parse the current on-disk state of the catalog.
///
/// Workflows call this at the start of every run ("reload before
/// resume") so incremental writes from an interrupted run are picked up
/// rather than overwritten.
pub fn load(path: &Path) -> Result<OrgDocument> {
    if !path.exists() {
        return Err(CinelogError::FileNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|e| CinelogError::io_with_path(e, path))?;
    Ok(super::parse(&text))
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "catalog".to_string());
    path.with_file_name(format!("{}.{}.tmp", name, process::id()))
}

fn backup_path_for(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "catalog".to_string());
    path.with_file_name(format!("{}.{}", name, suffix))
}
