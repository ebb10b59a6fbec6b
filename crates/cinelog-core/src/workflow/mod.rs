//! Batch workflows, one per subcommand.
//!
//! Each workflow is one linear pass over the catalog: reload the
//! on-disk state, back it up once, walk the records in file order, and
//! checkpoint after every mutation. Re-running an interrupted pass is
//! safe because already-resolved records are skipped via their gating
//! properties.

mod dedupe;
mod enrich;
mod inject;
mod match_pass;

pub use dedupe::{run_dedupe, DedupeStats};
pub use enrich::{run_enrich, EnrichStats};
pub use inject::{run_inject, InjectStats};
pub use match_pass::{run_match, MatchStats};

/// Behavior flags shared by every workflow.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Report what would change without touching the file.
    pub dry_run: bool,
    /// Create the backup-once copy before the first mutation.
    pub backup: bool,
    /// Stop after this many records were actually processed.
    pub limit: Option<usize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            backup: true,
            limit: None,
        }
    }
}
