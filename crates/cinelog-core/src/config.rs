//! Centralized configuration for cinelog.
//!
//! Fixed tunables (thresholds, timeouts, property names) live in
//! const-holder structs; per-run settings travel in [`TmdbConfig`],
//! which is passed into the lookup client at construction. There is no
//! process-wide mutable configuration.

use std::time::Duration;

/// TMDB API base URL.
pub const TMDB_API_BASE: &str = "https://api.themoviedb.org/3";

/// Runtime configuration for the TMDB lookup client.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    /// API key, resolved from the CLI override or the local secret store.
    pub api_key: String,
    /// Locale sent with every request (the catalog is German-language).
    pub language: String,
    /// API base URL (overridable for tests).
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Fixed delay enforced after every external call.
    pub rate_limit_delay: Duration,
}

impl TmdbConfig {
    /// Build a config with default locale, timeout, and rate limiting.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            language: "de-DE".to_string(),
            base_url: TMDB_API_BASE.to_string(),
            timeout: NetworkConfig::REQUEST_TIMEOUT,
            rate_limit_delay: NetworkConfig::RATE_LIMIT_DELAY,
        }
    }
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
    /// 4 requests per second, per the TMDB request-rate policy.
    pub const RATE_LIMIT_DELAY: Duration = Duration::from_millis(250);
    pub const USER_AGENT: &'static str = "cinelog/0.3";
}

/// Match scoring and classification thresholds.
pub struct MatchConfig;

impl MatchConfig {
    /// Score at or above which a match is accepted without review.
    pub const HIGH_CONFIDENCE: f64 = 85.0;
    /// Score at or above which a match is plausible but needs review.
    pub const MEDIUM_CONFIDENCE: f64 = 70.0;
    /// Number of search results considered per query.
    pub const MAX_CANDIDATES: usize = 10;
    /// Bonus when the year hint matches the release year exactly.
    pub const YEAR_EXACT_BONUS: f64 = 10.0;
    /// Bonus when the year hint is off by one.
    pub const YEAR_ADJACENT_BONUS: f64 = 5.0;
    /// Inclusive range of plausible release years for heading hints.
    pub const YEAR_MIN: i32 = 1920;
    pub const YEAR_MAX: i32 = 2025;
}

/// Property keys with pipeline meaning.
///
/// Keys are stored uppercase in parsed records, so these constants are
/// the canonical spellings.
pub struct PropKeys;

impl PropKeys {
    pub const TMDB_ID: &'static str = "TMDB_ID";
    pub const TMDB_TITLE: &'static str = "TMDB_TITLE";
    pub const TMDB_CONFIDENCE: &'static str = "TMDB_CONFIDENCE";
    pub const NEEDS_REVIEW: &'static str = "NEEDS_REVIEW";
    pub const SUGGESTED_SEARCH: &'static str = "SUGGESTED_SEARCH";
    pub const AI_VERIFIED: &'static str = "AI_VERIFIED";
    pub const AI_TITLE: &'static str = "AI_TITLE";
    pub const AI_NOTES: &'static str = "AI_NOTES";
    pub const YEAR: &'static str = "YEAR";
    pub const BACKFILLED: &'static str = "BACKFILLED";
    pub const RUNTIME: &'static str = "RUNTIME";
    pub const ORIGINAL_TITLE: &'static str = "ORIGINAL_TITLE";
    pub const ORIGINAL_LANGUAGE: &'static str = "ORIGINAL_LANGUAGE";
    pub const DIRECTOR: &'static str = "DIRECTOR";
    pub const ACTORS: &'static str = "ACTORS";
    pub const COUNTRIES: &'static str = "COUNTRIES";
    pub const PRODUCTION_COMPANIES: &'static str = "PRODUCTION_COMPANIES";
    pub const GENRES: &'static str = "GENRES";
    pub const IMDB_ID: &'static str = "IMDB_ID";
    pub const TMDB_RATING: &'static str = "TMDB_RATING";
    pub const VOTE_COUNT: &'static str = "VOTE_COUNT";
}
