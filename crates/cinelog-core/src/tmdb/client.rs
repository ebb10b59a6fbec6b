//! HTTP client for the movie database API.

use super::types::{MovieDetails, SearchResponse};
use super::MovieLookup;
use crate::config::{NetworkConfig, TmdbConfig};
use crate::matching::SearchCandidate;
use crate::{CinelogError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

/// Client bound to one API key and one result language.
pub struct TmdbClient {
    client: Client,
    config: TmdbConfig,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| CinelogError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(e),
            })?;

        Ok(Self { client, config })
    }

    fn search_url(&self, query: &str, year: Option<i32>) -> String {
        let mut url = format!(
            "{}/search/movie?api_key={}&query={}&language={}&include_adult=false",
            self.config.base_url,
            self.config.api_key,
            urlencoding::encode(query),
            self.config.language,
        );
        if let Some(year) = year {
            url.push_str(&format!("&year={}", year));
        }
        url
    }

    fn details_url(&self, tmdb_id: u64) -> String {
        format!(
            "{}/movie/{}?api_key={}&language={}&append_to_response=credits,external_ids",
            self.config.base_url, tmdb_id, self.config.api_key, self.config.language,
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CinelogError::Network {
                message: format!("GET {} failed: {}", what, e),
                source: Some(e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CinelogError::Network {
                message: format!("GET {} returned {}", what, status),
                source: None,
            });
        }

        response.json::<T>().await.map_err(|e| CinelogError::Network {
            message: format!("Failed to decode {} response: {}", what, e),
            source: Some(e),
        })
    }
}

#[async_trait]
impl MovieLookup for TmdbClient {
    async fn search(&self, query: &str, year: Option<i32>) -> Result<Vec<SearchCandidate>> {
        let url = self.search_url(query, year);
        let response: SearchResponse = self.get_json(&url, "movie search").await?;
        debug!(
            "Search '{}' (year: {:?}): {} candidates",
            query,
            year,
            response.results.len()
        );
        Ok(response.results)
    }

    async fn movie_details(&self, tmdb_id: u64) -> Result<Option<MovieDetails>> {
        let url = self.details_url(tmdb_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CinelogError::Network {
                message: format!("GET movie details failed: {}", e),
                source: Some(e),
            })?;

        // A stale or hand-typed id is a per-record condition, not an error.
        if response.status() == StatusCode::NOT_FOUND {
            warn!("Movie {} not found", tmdb_id);
            return Ok(None);
        }

        let status = response.status();
        if !status.is_success() {
            return Err(CinelogError::Network {
                message: format!("GET movie details returned {}", status),
                source: None,
            });
        }

        let details = response
            .json::<MovieDetails>()
            .await
            .map_err(|e| CinelogError::Network {
                message: format!("Failed to decode movie details: {}", e),
                source: Some(e),
            })?;
        Ok(Some(details))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config() -> TmdbConfig {
        TmdbConfig {
            api_key: "test-key".to_string(),
            language: "de-DE".to_string(),
            base_url: "https://api.example.test/3".to_string(),
            timeout: Duration::from_secs(10),
            rate_limit_delay: Duration::from_millis(250),
        }
    }

    #[test]
    fn test_search_url_encodes_query() {
        let client = TmdbClient::new(test_config()).unwrap();
        let url = client.search_url("Der blaue Engel", Some(1930));
        assert!(url.starts_with("https://api.example.test/3/search/movie?"));
        assert!(url.contains("query=Der%20blaue%20Engel"));
        assert!(url.contains("language=de-DE"));
        assert!(url.contains("include_adult=false"));
        assert!(url.contains("&year=1930"));
    }

    #[test]
    fn test_search_url_omits_absent_year() {
        let client = TmdbClient::new(test_config()).unwrap();
        let url = client.search_url("Heat", None);
        assert!(!url.contains("&year="));
    }

    #[test]
    fn test_details_url_appends_credits_and_external_ids() {
        let client = TmdbClient::new(test_config()).unwrap();
        let url = client.details_url(949);
        assert!(url.contains("/movie/949?"));
        assert!(url.contains("append_to_response=credits,external_ids"));
    }
}
