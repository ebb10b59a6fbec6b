//! Movie database lookup.
//!
//! The [`MovieLookup`] trait is the seam between the workflows and the
//! network: production code talks to [`TmdbClient`], tests substitute a
//! canned lookup and exercise the full pipeline offline.

mod client;
pub mod types;

pub use client::TmdbClient;
pub use types::MovieDetails;

use crate::matching::SearchCandidate;
use crate::Result;
use async_trait::async_trait;

/// Remote movie lookup operations the workflows depend on.
#[async_trait]
pub trait MovieLookup: Send + Sync {
    /// Search for movies matching a free-text query, optionally
    /// restricted to a release year.
    async fn search(&self, query: &str, year: Option<i32>) -> Result<Vec<SearchCandidate>>;

    /// Fetch the full record for a known id. `Ok(None)` means the id
    /// does not exist (deleted or mistyped), which callers treat as a
    /// per-record skip rather than a failure.
    async fn movie_details(&self, tmdb_id: u64) -> Result<Option<MovieDetails>>;
}
