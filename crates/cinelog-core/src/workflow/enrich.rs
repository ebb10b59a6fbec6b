//! Enrich pass: backfill metadata for already-matched records.

use super::RunOptions;
use crate::config::PropKeys;
use crate::document::{ensure_backup, load, write_atomic};
use crate::merge::{apply_update, MergeMode, PropertyUpdate};
use crate::tmdb::{MovieDetails, MovieLookup};
use crate::Result;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Backup suffix for the enrich pass, distinct from the match pass so
/// both pristine inputs survive.
const BACKUP_SUFFIX: &str = "bak2";

#[derive(Debug, Clone, Default)]
pub struct EnrichStats {
    pub total: usize,
    /// No usable `TMDB_ID`.
    pub skipped_no_id: usize,
    /// `NEEDS_REVIEW: true` or already backfilled.
    pub skipped_gated: usize,
    pub enriched: usize,
    /// Fetch failed or id unknown; record left untouched.
    pub errors: usize,
}

/// Build the enrichment update in the declared property order.
fn enrichment_update(details: &MovieDetails) -> PropertyUpdate {
    PropertyUpdate::new(MergeMode::Append)
        .set_opt(
            PropKeys::YEAR,
            details.release_year().map(|y| y.to_string()),
        )
        .set_opt(PropKeys::RUNTIME, details.runtime.map(|r| r.to_string()))
        .set(PropKeys::ORIGINAL_TITLE, details.original_title.as_str())
        .set(
            PropKeys::ORIGINAL_LANGUAGE,
            details.original_language.to_uppercase(),
        )
        .set_opt(PropKeys::DIRECTOR, details.directors().into_iter().next())
        .set(PropKeys::ACTORS, details.lead_actors())
        .set(PropKeys::COUNTRIES, details.country_codes())
        .set(PropKeys::PRODUCTION_COMPANIES, details.company_names())
        .set(PropKeys::GENRES, details.genre_names())
        .set_opt(PropKeys::IMDB_ID, details.external_ids.imdb_id.clone())
        .set_opt(
            PropKeys::TMDB_RATING,
            details.vote_average.map(|r| format!("{:.1}", r)),
        )
        .set_opt(
            PropKeys::VOTE_COUNT,
            details.vote_count.map(|v| v.to_string()),
        )
        .set(PropKeys::BACKFILLED, "true")
}

/// Run the enrich pass over a catalog file.
pub async fn run_enrich(
    path: &Path,
    lookup: &dyn MovieLookup,
    delay: Duration,
    options: &RunOptions,
) -> Result<EnrichStats> {
    let mut doc = load(path)?;
    let mut stats = EnrichStats::default();

    if options.backup && !options.dry_run {
        ensure_backup(path, BACKUP_SUFFIX)?;
    }

    let mut processed = 0usize;

    for idx in 0..doc.records.len() {
        stats.total += 1;

        if let Some(limit) = options.limit {
            if processed >= limit {
                stats.skipped_gated += 1;
                continue;
            }
        }

        let record = &doc.records[idx];

        let Some(tmdb_id) = record
            .prop(PropKeys::TMDB_ID)
            .and_then(|v| v.trim().parse::<u64>().ok())
        else {
            stats.skipped_no_id += 1;
            continue;
        };

        if record.prop_is(PropKeys::NEEDS_REVIEW, "true") || record.has_prop(PropKeys::BACKFILLED)
        {
            stats.skipped_gated += 1;
            continue;
        }

        info!("Enriching '{}' (id {})", record.heading, tmdb_id);
        let details = lookup.movie_details(tmdb_id).await;
        tokio::time::sleep(delay).await;
        processed += 1;

        let details = match details {
            Ok(Some(details)) => details,
            Ok(None) => {
                warn!("No details for id {}, leaving record untouched", tmdb_id);
                stats.errors += 1;
                continue;
            }
            Err(e) => {
                warn!("Detail fetch failed for id {}: {}", tmdb_id, e);
                stats.errors += 1;
                continue;
            }
        };

        let update = enrichment_update(&details);
        if apply_update(&mut doc.records[idx], &update) {
            stats.enriched += 1;
            if !options.dry_run {
                write_atomic(path, &doc)?;
            }
        }
    }

    info!(
        "Enrich pass done: {} enriched, {} errors, {} gated, {} without id",
        stats.enriched, stats.errors, stats.skipped_gated, stats.skipped_no_id
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse;
    use crate::tmdb::types::{CastMember, Credits, CrewMember, ExternalIds, Genre};

    fn sample_details() -> MovieDetails {
        MovieDetails {
            id: 949,
            title: "Heat".to_string(),
            original_title: "Heat".to_string(),
            original_language: "en".to_string(),
            release_date: "1995-12-15".to_string(),
            runtime: Some(170),
            genres: vec![Genre {
                name: "Crime".to_string(),
            }],
            production_countries: Vec::new(),
            production_companies: Vec::new(),
            vote_average: Some(7.917),
            vote_count: Some(6500),
            credits: Credits {
                crew: vec![CrewMember {
                    name: "Michael Mann".to_string(),
                    job: "Director".to_string(),
                }],
                cast: vec![CastMember {
                    name: "Al Pacino".to_string(),
                }],
            },
            external_ids: ExternalIds {
                imdb_id: Some("tt0113277".to_string()),
            },
        }
    }

    #[test]
    fn test_enrichment_update_order_and_formatting() {
        let mut record = parse("* Heat\n:PROPERTIES:\n:TMDB_ID: 949\n:END:\n")
            .records
            .remove(0);
        apply_update(&mut record, &enrichment_update(&sample_details()));

        assert_eq!(record.prop(PropKeys::YEAR), Some("1995"));
        assert_eq!(record.prop(PropKeys::RUNTIME), Some("170"));
        assert_eq!(record.prop(PropKeys::ORIGINAL_LANGUAGE), Some("EN"));
        assert_eq!(record.prop(PropKeys::DIRECTOR), Some("Michael Mann"));
        assert_eq!(record.prop(PropKeys::TMDB_RATING), Some("7.9"));
        assert_eq!(record.prop(PropKeys::BACKFILLED), Some("true"));
        // Empty countries/companies are omitted entirely.
        assert_eq!(record.prop(PropKeys::COUNTRIES), None);
        assert_eq!(record.prop(PropKeys::PRODUCTION_COMPANIES), None);

        // BACKFILLED is the last property before :END:.
        let block = record.block.as_ref().unwrap();
        let last = block
            .properties
            .iter()
            .max_by_key(|p| p.line)
            .unwrap();
        assert_eq!(last.key, PropKeys::BACKFILLED);
    }
}
