//! Cinelog Core - Library for enriching an org-mode movie catalog.
//!
//! This crate provides the full pipeline behind the `cinelog` binary:
//! parse a plain-text catalog into records, resolve records against the
//! TMDB search API, merge results back into property drawers, and
//! rewrite the file atomically with backup-once semantics.
//!
//! # Example
//!
//! ```rust,ignore
//! use cinelog_core::config::{NetworkConfig, TmdbConfig};
//! use cinelog_core::tmdb::TmdbClient;
//! use cinelog_core::workflow::{run_match, RunOptions};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> cinelog_core::Result<()> {
//!     let key = cinelog_core::secrets::resolve_api_key(None).await?;
//!     let client = TmdbClient::new(TmdbConfig::new(key))?;
//!
//!     let stats = run_match(
//!         Path::new("catalog.org"),
//!         &client,
//!         NetworkConfig::RATE_LIMIT_DELAY,
//!         &RunOptions::default(),
//!     )
//!     .await?;
//!     println!("Matched {} records", stats.matched);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod matching;
pub mod merge;
pub mod normalize;
pub mod secrets;
pub mod tmdb;
pub mod workflow;

// Re-export commonly used types
pub use document::{OrgDocument, Property, PropertyBlock, Record};
pub use error::{CinelogError, Result};
pub use matching::{best_match, MatchResult, MatchTier, SearchCandidate};
pub use merge::{apply_update, MergeMode, PropertyUpdate};
pub use tmdb::{MovieLookup, TmdbClient};
