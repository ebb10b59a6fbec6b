//! Candidate scoring and confidence classification.
//!
//! Pure functions over (query, year hint, candidates); nothing here
//! touches the network, so the whole decision procedure is unit
//! testable against literal candidate lists.

use crate::config::MatchConfig;
use serde::Deserialize;

/// One search result from the lookup API. Ephemeral, used only during
/// scoring.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchCandidate {
    pub id: u64,
    /// Localized title.
    #[serde(default)]
    pub title: String,
    /// Title in the film's original language.
    #[serde(default)]
    pub original_title: String,
    /// `YYYY-MM-DD`, possibly empty.
    #[serde(default)]
    pub release_date: String,
}

impl SearchCandidate {
    /// Release year parsed from the date prefix, if present.
    pub fn release_year(&self) -> Option<i32> {
        self.release_date.split('-').next()?.parse().ok()
    }
}

/// Coarse classification of a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Score >= 85: accepted without review.
    High,
    /// Score >= 70: plausible, review required.
    Medium,
    /// Anything lower, review required.
    Low,
    /// The lookup returned no candidates at all.
    None,
}

impl MatchTier {
    fn from_score(score: f64) -> Self {
        if score >= MatchConfig::HIGH_CONFIDENCE {
            MatchTier::High
        } else if score >= MatchConfig::MEDIUM_CONFIDENCE {
            MatchTier::Medium
        } else {
            MatchTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::High => "HIGH_CONFIDENCE",
            MatchTier::Medium => "MEDIUM_CONFIDENCE",
            MatchTier::Low => "LOW_CONFIDENCE",
            MatchTier::None => "NO_RESULTS",
        }
    }
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of resolving one record against the lookup results.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Best candidate's identifier; absent when there were no candidates.
    pub tmdb_id: Option<u64>,
    /// Best candidate's localized title.
    pub title: Option<String>,
    /// Confidence score, 0-100.
    pub confidence: f64,
    pub tier: MatchTier,
    /// True whenever the tier is anything but [`MatchTier::High`].
    pub needs_review: bool,
}

impl MatchResult {
    fn no_results() -> Self {
        Self {
            tmdb_id: None,
            title: None,
            confidence: 0.0,
            tier: MatchTier::None,
            needs_review: true,
        }
    }
}

/// Similarity of the query against a single candidate, 0-100.
///
/// Base score is the better of the normalized-edit-distance ratios
/// against the localized and the original title, case-insensitively.
/// A year hint adds +10 on exact release-year agreement or +5 when off
/// by one; the total is capped at 100.
pub fn score_candidate(query: &str, year_hint: Option<i32>, candidate: &SearchCandidate) -> f64 {
    let query = query.to_lowercase();
    let ratio = |title: &str| strsim::normalized_levenshtein(&query, &title.to_lowercase()) * 100.0;

    let base = ratio(&candidate.title).max(ratio(&candidate.original_title));

    let bonus = match (year_hint, candidate.release_year()) {
        (Some(hint), Some(year)) if hint == year => MatchConfig::YEAR_EXACT_BONUS,
        (Some(hint), Some(year)) if (hint - year).abs() == 1 => MatchConfig::YEAR_ADJACENT_BONUS,
        _ => 0.0,
    };

    (base + bonus).min(100.0)
}

/// Pick the best candidate and classify the confidence.
///
/// At most [`MatchConfig::MAX_CANDIDATES`] results are considered, in
/// the order the lookup returned them. Ties keep that order: the API's
/// own relevance ranking is the tiebreak.
pub fn best_match(
    query: &str,
    year_hint: Option<i32>,
    candidates: &[SearchCandidate],
) -> MatchResult {
    if candidates.is_empty() {
        return MatchResult::no_results();
    }

    let mut scored: Vec<(f64, &SearchCandidate)> = candidates
        .iter()
        .take(MatchConfig::MAX_CANDIDATES)
        .map(|c| (score_candidate(query, year_hint, c), c))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let (score, best) = scored[0];
    let tier = MatchTier::from_score(score);

    MatchResult {
        tmdb_id: Some(best.id),
        title: Some(best.title.clone()),
        confidence: score,
        tier,
        needs_review: tier != MatchTier::High,
    }
}
