//! Response types for the movie database API.
//!
//! Everything deserializes permissively: fields the API omits default to
//! empty so a sparse record (an obscure short film with no credits)
//! never fails the whole fetch.

use serde::Deserialize;

/// Envelope of a `/search/movie` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<crate::matching::SearchCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Genre {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductionCountry {
    #[serde(default)]
    pub iso_3166_1: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductionCompany {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrewMember {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub job: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CastMember {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub crew: Vec<CrewMember>,
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalIds {
    #[serde(default)]
    pub imdb_id: Option<String>,
}

/// Full movie record from `/movie/{id}` with credits and external ids
/// appended.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub original_language: String,
    /// `YYYY-MM-DD`, possibly empty.
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub production_countries: Vec<ProductionCountry>,
    #[serde(default)]
    pub production_companies: Vec<ProductionCompany>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub credits: Credits,
    #[serde(default)]
    pub external_ids: ExternalIds,
}

/// How many cast members become the `ACTORS` property.
const ACTOR_LIMIT: usize = 3;

/// How many production companies are kept.
const COMPANY_LIMIT: usize = 3;

impl MovieDetails {
    /// Release year parsed from the date prefix, if present.
    pub fn release_year(&self) -> Option<i32> {
        self.release_date.split('-').next()?.parse().ok()
    }

    /// Names of everyone credited with the `Director` job.
    pub fn directors(&self) -> Vec<String> {
        self.credits
            .crew
            .iter()
            .filter(|member| member.job == "Director")
            .map(|member| member.name.clone())
            .collect()
    }

    /// Top-billed cast, capped.
    pub fn lead_actors(&self) -> Vec<String> {
        self.credits
            .cast
            .iter()
            .take(ACTOR_LIMIT)
            .map(|member| member.name.clone())
            .collect()
    }

    pub fn genre_names(&self) -> Vec<String> {
        self.genres.iter().map(|g| g.name.clone()).collect()
    }

    pub fn country_codes(&self) -> Vec<String> {
        self.production_countries
            .iter()
            .map(|c| c.iso_3166_1.clone())
            .collect()
    }

    pub fn company_names(&self) -> Vec<String> {
        self.production_companies
            .iter()
            .take(COMPANY_LIMIT)
            .map(|c| c.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_details() -> MovieDetails {
        serde_json::from_str(
            r#"{
                "id": 949,
                "title": "Heat",
                "original_title": "Heat",
                "original_language": "en",
                "release_date": "1995-12-15",
                "runtime": 170,
                "genres": [{"id": 28, "name": "Action"}, {"id": 80, "name": "Crime"}],
                "production_countries": [{"iso_3166_1": "US", "name": "United States"}],
                "production_companies": [{"id": 1, "name": "Regency Enterprises"}],
                "vote_average": 7.9,
                "vote_count": 6500,
                "credits": {
                    "crew": [
                        {"name": "Michael Mann", "job": "Director"},
                        {"name": "Dante Spinotti", "job": "Director of Photography"}
                    ],
                    "cast": [
                        {"name": "Al Pacino"},
                        {"name": "Robert De Niro"},
                        {"name": "Val Kilmer"},
                        {"name": "Jon Voight"},
                        {"name": "Tom Sizemore"},
                        {"name": "Diane Venora"}
                    ]
                },
                "external_ids": {"imdb_id": "tt0113277"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_details_accessors() {
        let details = sample_details();
        assert_eq!(details.release_year(), Some(1995));
        assert_eq!(details.directors(), vec!["Michael Mann"]);
        // Cast is capped at three names.
        assert_eq!(details.lead_actors().len(), 3);
        assert_eq!(details.lead_actors()[0], "Al Pacino");
        assert_eq!(details.genre_names(), vec!["Action", "Crime"]);
        assert_eq!(details.country_codes(), vec!["US"]);
        assert_eq!(details.external_ids.imdb_id.as_deref(), Some("tt0113277"));
    }

    #[test]
    fn test_sparse_details_deserialize() {
        let details: MovieDetails = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(details.release_year(), None);
        assert!(details.directors().is_empty());
        assert!(details.lead_actors().is_empty());
        assert_eq!(details.runtime, None);
        assert_eq!(details.external_ids.imdb_id, None);
    }

    #[test]
    fn test_search_response_defaults() {
        let response: SearchResponse = serde_json::from_str(r#"{"page": 1}"#).unwrap();
        assert!(response.results.is_empty());
    }
}
