//! Match pass: resolve unidentified records against the lookup API.

use super::RunOptions;
use crate::config::PropKeys;
use crate::document::{ensure_backup, load, write_atomic};
use crate::matching::{best_match, MatchTier, SearchCandidate};
use crate::merge::{apply_update, MergeMode, PropertyUpdate};
use crate::normalize::{parse_heading, split_query_year};
use crate::tmdb::MovieLookup;
use crate::Result;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Backup suffix for the match pass.
const BACKUP_SUFFIX: &str = "bak";

#[derive(Debug, Clone, Default)]
pub struct MatchStats {
    /// Records examined.
    pub total: usize,
    /// Skipped via gating properties.
    pub skipped: usize,
    /// Matched without review (tier High).
    pub matched: usize,
    /// Matched but flagged for review.
    pub review: usize,
    /// Lookup returned nothing, record marked for review.
    pub no_results: usize,
}

/// Search query and year hint for one record, derived per the
/// suggested-search-first precedence.
fn query_for(record: &crate::document::Record) -> Option<(String, Option<i32>)> {
    let suggested = record
        .prop(PropKeys::SUGGESTED_SEARCH)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    let heading = parse_heading(&record.lines[0]);

    // A year token inside the query text becomes a hint and leaves the
    // query, so an exact title is not penalized for carrying it.
    let (query, query_year) = match &suggested {
        Some(s) => split_query_year(s),
        None => {
            let h = heading.as_ref()?;
            if h.cleaned.is_empty() {
                return None;
            }
            split_query_year(&h.cleaned)
        }
    };

    // Year precedence: explicit YEAR property, then a year token in the
    // query text, then the heading's own hint.
    let year_hint = record
        .prop(PropKeys::YEAR)
        .and_then(|v| v.trim().parse::<i32>().ok())
        .or(query_year)
        .or_else(|| heading.as_ref().and_then(|h| h.year_hint));

    Some((query, year_hint))
}

/// Search with the year hint, falling back to an unrestricted search
/// when the restricted one comes back empty. Lookup failures are logged
/// and treated as zero candidates.
async fn search_with_fallback(
    lookup: &dyn MovieLookup,
    query: &str,
    year_hint: Option<i32>,
    delay: Duration,
) -> Vec<SearchCandidate> {
    let results = match lookup.search(query, year_hint).await {
        Ok(results) => results,
        Err(e) => {
            warn!("Search failed for '{}': {}", query, e);
            Vec::new()
        }
    };
    tokio::time::sleep(delay).await;

    if !results.is_empty() || year_hint.is_none() {
        return results;
    }

    let retry = match lookup.search(query, None).await {
        Ok(results) => results,
        Err(e) => {
            warn!("Retry search failed for '{}': {}", query, e);
            Vec::new()
        }
    };
    tokio::time::sleep(delay).await;
    retry
}

/// Run the match pass over a catalog file.
pub async fn run_match(
    path: &Path,
    lookup: &dyn MovieLookup,
    delay: Duration,
    options: &RunOptions,
) -> Result<MatchStats> {
    let mut doc = load(path)?;
    let mut stats = MatchStats::default();

    if options.backup && !options.dry_run {
        ensure_backup(path, BACKUP_SUFFIX)?;
    }

    let mut processed = 0usize;

    for idx in 0..doc.records.len() {
        stats.total += 1;

        if let Some(limit) = options.limit {
            if processed >= limit {
                stats.skipped += 1;
                continue;
            }
        }

        let record = &doc.records[idx];

        // A present identifier exempts the record from re-matching; a
        // verified record with review cleared is finalized.
        if record.has_prop(PropKeys::TMDB_ID)
            || (record.prop_is(PropKeys::AI_VERIFIED, "true")
                && record.prop_is(PropKeys::NEEDS_REVIEW, "false"))
        {
            stats.skipped += 1;
            continue;
        }

        let Some((query, year_hint)) = query_for(record) else {
            stats.skipped += 1;
            continue;
        };

        info!(
            "Matching '{}' (query: '{}', year: {:?})",
            record.heading, query, year_hint
        );
        let candidates = search_with_fallback(lookup, &query, year_hint, delay).await;
        processed += 1;

        let result = best_match(&query, year_hint, &candidates);

        let update = match result.tmdb_id {
            Some(tmdb_id) => {
                let mut update = PropertyUpdate::new(MergeMode::Append)
                    .set(PropKeys::TMDB_ID, tmdb_id.to_string())
                    .set_opt(PropKeys::TMDB_TITLE, result.title.clone())
                    .set(PropKeys::TMDB_CONFIDENCE, format!("{:.2}", result.confidence))
                    .remove(PropKeys::SUGGESTED_SEARCH);
                if result.needs_review {
                    update = update.set(PropKeys::NEEDS_REVIEW, "true");
                    stats.review += 1;
                } else {
                    update = update.remove(PropKeys::NEEDS_REVIEW);
                    stats.matched += 1;
                }
                info!(
                    "  {} ({:.2}) -> {:?}",
                    result.tier, result.confidence, result.title
                );
                update
            }
            None => {
                stats.no_results += 1;
                info!("  {} for '{}'", MatchTier::None, query);
                PropertyUpdate::new(MergeMode::Append).set(PropKeys::NEEDS_REVIEW, "true")
            }
        };

        if apply_update(&mut doc.records[idx], &update) && !options.dry_run {
            write_atomic(path, &doc)?;
        }
    }

    info!(
        "Match pass done: {} matched, {} for review, {} without results, {} skipped",
        stats.matched, stats.review, stats.no_results, stats.skipped
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse;

    fn record_from(text: &str) -> crate::document::Record {
        parse(text).records.remove(0)
    }

    #[test]
    fn test_query_prefers_suggested_search() {
        let record = record_from(
            "* Schimmelreiter ´1984\n:PROPERTIES:\n:SUGGESTED_SEARCH: Der Schimmelreiter 1984\n:END:\n",
        );
        let (query, year) = query_for(&record).unwrap();
        assert_eq!(query, "Der Schimmelreiter");
        assert_eq!(year, Some(1984));
    }

    #[test]
    fn test_query_falls_back_to_heading() {
        let record = record_from("* Der blaue Engel (´1930)\n");
        let (query, year) = query_for(&record).unwrap();
        assert_eq!(query, "Der blaue Engel");
        assert_eq!(year, Some(1930));
    }

    #[test]
    fn test_year_property_outranks_query_text() {
        let record = record_from(
            "* A\n:PROPERTIES:\n:SUGGESTED_SEARCH: Heat 1995\n:YEAR: 1994\n:END:\n",
        );
        let (_, year) = query_for(&record).unwrap();
        assert_eq!(year, Some(1994));
    }
}
