//! API key retrieval.
//!
//! The key comes from an explicit override (a CLI flag) or from the
//! `pass` password store. It is never read from the catalog file and
//! never written anywhere.

use crate::{CinelogError, Result};
use tokio::process::Command;
use tracing::debug;

/// Password-store entry holding the API key.
const PASS_ENTRY: &str = "tmdb/api-key";

/// Resolve the API key, preferring an explicit override.
pub async fn resolve_api_key(override_key: Option<String>) -> Result<String> {
    if let Some(key) = override_key {
        let key = key.trim().to_string();
        if key.is_empty() {
            return Err(CinelogError::MissingCredentials {
                message: "Provided API key is empty".to_string(),
            });
        }
        debug!("Using API key from command line");
        return Ok(key);
    }

    let output = Command::new("pass")
        .arg(PASS_ENTRY)
        .output()
        .await
        .map_err(|e| CinelogError::MissingCredentials {
            message: format!("Failed to run pass for '{}': {}", PASS_ENTRY, e),
        })?;

    if !output.status.success() {
        return Err(CinelogError::MissingCredentials {
            message: format!(
                "pass exited with {} for '{}'",
                output.status, PASS_ENTRY
            ),
        });
    }

    // The key is the first line; pass may append metadata lines.
    let key = String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or("")
        .trim()
        .to_string();

    if key.is_empty() {
        return Err(CinelogError::MissingCredentials {
            message: format!("pass returned an empty key for '{}'", PASS_ENTRY),
        });
    }

    debug!("Resolved API key from password store");
    Ok(key)
}
