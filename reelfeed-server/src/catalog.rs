use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;

use reelfeed_types::Movie;

/// Errors from the external movie catalog. A failure here is fatal to the
/// action that needed the movie: no local Movie record can be materialized,
/// so the review or watchlist entry referencing it cannot be created.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("movie {0} not found in catalog")]
    NotFound(i64),

    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// External movie catalog abstraction.
///
/// The production implementation talks to a TMDB-style HTTP API; tests
/// substitute a stub so no network is involved.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Fetch display fields for a movie by its catalog id.
    async fn fetch_movie(&self, tmdb_id: i64) -> Result<Movie, CatalogError>;
}

/// TMDB-backed catalog client
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_url: String,
    api_key: String,
}

impl TmdbCatalog {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TmdbMovieResponse {
    id: i64,
    title: String,
    poster_path: Option<String>,
    release_date: Option<String>,
}

#[async_trait]
impl MovieCatalog for TmdbCatalog {
    async fn fetch_movie(&self, tmdb_id: i64) -> Result<Movie, CatalogError> {
        let url = format!("{}/movie/{}?api_key={}", self.api_url, tmdb_id, self.api_key);
        let response = self.http_client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(tmdb_id));
        }
        let raw: TmdbMovieResponse = response.error_for_status()?.json().await?;

        // "1999-10-15" -> 1999; an empty or odd date just leaves the year unset
        let release_year = raw
            .release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse::<i32>().ok());

        Ok(Movie {
            tmdb_id: raw.id,
            title: raw.title,
            poster_path: raw.poster_path,
            release_year,
            release_date: raw.release_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_year_extraction() {
        let raw = TmdbMovieResponse {
            id: 550,
            title: "Fight Club".to_string(),
            poster_path: None,
            release_date: Some("1999-10-15".to_string()),
        };
        let year = raw
            .release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse::<i32>().ok());
        assert_eq!(year, Some(1999));
    }

    #[test]
    fn test_release_year_tolerates_empty_date() {
        let release_date: Option<String> = Some(String::new());
        let year = release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse::<i32>().ok());
        assert_eq!(year, None);
    }
}
