//! Heading normalization for search queries.
//!
//! Catalog headings are free text accumulated over years of hand
//! editing: `* Film Title (´1964_/Trailer)`, stray quote characters,
//! trailing slashes. This module extracts a search-friendly title and a
//! plausible release-year hint from that noise. Everything here is pure
//! and deterministic.

use crate::config::MatchConfig;
use regex::Regex;
use std::sync::LazyLock;

/// Regex for a 4-digit token, optionally preceded by a quote-like
/// character (`´1964`, `'2016`, `1964`).
static YEAR_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[´']?(\d{4})").unwrap());

/// Regex for a standalone plausible year inside free query text.
static YEAR_IN_QUERY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19\d{2}|20[0-2]\d)\b").unwrap());

/// Parenthesized annotation segments (country, year, format notes).
static PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());

/// Quote-like characters that are catalog decoration, not title text.
static QUOTE_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[´']").unwrap());

/// Trailing slash/underscore decorations.
static TRAILING_DECOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[_/\s]+$").unwrap());

/// Repeated whitespace.
static MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// A heading reduced to its searchable parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingTitle {
    /// Full heading text as written, marker stripped.
    pub raw: String,
    /// Search-friendly title with annotations and decorations removed.
    pub cleaned: String,
    /// Plausible release year, if the heading contains one.
    pub year_hint: Option<i32>,
}

/// Parse a heading line into a cleaned title and year hint.
///
/// Returns `None` unless the line has the `* `-marker-then-text shape.
/// A 4-digit token is accepted as a year hint only within the inclusive
/// [1920, 2025] range, which filters out catalog codes and running
/// times that happen to have four digits.
///
/// # Examples
///
/// ```
/// use cinelog_core::normalize::parse_heading;
///
/// let title = parse_heading("* Film Title (´1964_/Trailer)").unwrap();
/// assert_eq!(title.cleaned, "Film Title");
/// assert_eq!(title.year_hint, Some(1964));
/// ```
pub fn parse_heading(line: &str) -> Option<HeadingTitle> {
    let raw = line.trim().strip_prefix("* ")?.trim();
    if raw.is_empty() {
        return None;
    }

    let year_hint = YEAR_TOKEN
        .captures(raw)
        .and_then(|caps| caps[1].parse::<i32>().ok())
        .filter(|&y| (MatchConfig::YEAR_MIN..=MatchConfig::YEAR_MAX).contains(&y));

    let mut cleaned = PARENTHETICAL.replace_all(raw, "").to_string();
    cleaned = QUOTE_CHARS.replace_all(&cleaned, "").to_string();
    cleaned = TRAILING_DECOR.replace(cleaned.trim(), "").to_string();
    cleaned = MULTI_SPACE.replace_all(&cleaned, " ").trim().to_string();

    Some(HeadingTitle {
        raw: raw.to_string(),
        cleaned,
        year_hint,
    })
}

/// Extract a plausible year from free query text (a `SUGGESTED_SEARCH`
/// value like `"Heat 1995"`).
pub fn extract_year_hint(text: &str) -> Option<i32> {
    YEAR_IN_QUERY
        .captures(text)
        .and_then(|caps| caps[1].parse::<i32>().ok())
}

/// Split free query text into (title, year hint).
///
/// The year token does not belong in the similarity comparison: scoring
/// `"Heat 1995"` against the candidate title `"Heat"` would penalize an
/// exact match for carrying its own disambiguator. The year moves into
/// the hint and is removed from the query text.
pub fn split_query_year(text: &str) -> (String, Option<i32>) {
    let year = extract_year_hint(text);
    if year.is_none() {
        return (text.trim().to_string(), None);
    }

    let stripped = YEAR_IN_QUERY.replace(text, "");
    let title = MULTI_SPACE.replace_all(stripped.trim(), " ").to_string();
    if title.is_empty() {
        // A query that was only a year keeps its text.
        return (text.trim().to_string(), year);
    }
    (title, year)
}
