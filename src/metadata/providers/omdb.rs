//! OMDb ratings provider.
//!
//! Implements [`RatingsProvider`] against the OMDb query API. OMDb reports
//! "not found" inside a 200 response (`"Response": "False"`), so every
//! payload is checked and turned into an error when it is not a hit.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::http::{url_with_params, HttpFetch};
use crate::metadata::provider::{RatingsProvider, RatingsRecord, RatingsSearchHit};

const ROTTEN_TOMATOES: &str = "Rotten Tomatoes";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbEnvelope {
    #[serde(default)]
    response: String,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbMovie {
    title: Option<String>,
    year: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    #[serde(default)]
    ratings: Vec<OmdbRating>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbRating {
    source: String,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbSearch {
    #[serde(default)]
    search: Vec<OmdbSearchItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbSearchItem {
    title: Option<String>,
    year: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
}

/// OMDb client.
pub struct OmdbProvider {
    fetcher: Arc<dyn HttpFetch>,
    api_key: String,
    base_url: String,
}

impl OmdbProvider {
    pub fn new(fetcher: Arc<dyn HttpFetch>, api_key: String, base_url: String) -> Self {
        Self {
            fetcher,
            api_key,
            base_url,
        }
    }

    /// GET with the key attached; fails on transport errors, non-2xx and
    /// `"Response": "False"` payloads.
    async fn query<T: serde::de::DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> anyhow::Result<T> {
        let mut all = vec![("apikey", self.api_key.as_str())];
        all.extend_from_slice(params);
        let url = url_with_params(&self.base_url, &all)?;

        let resp = self
            .fetcher
            .get(&url)
            .await
            .map_err(|e| anyhow::anyhow!("OMDb request failed: {}", self.redact(&e.to_string())))?;

        if !resp.is_success() {
            anyhow::bail!("OMDb returned HTTP {} for {}", resp.status, self.redact(&url));
        }

        let envelope: OmdbEnvelope = resp.json()?;
        if envelope.response != "True" {
            anyhow::bail!(
                "OMDb: {}",
                envelope.error.as_deref().unwrap_or("no result")
            );
        }

        Ok(resp.json()?)
    }

    fn redact(&self, text: &str) -> String {
        if self.api_key.is_empty() {
            text.to_string()
        } else {
            text.replace(&self.api_key, "***")
        }
    }
}

impl From<OmdbMovie> for RatingsRecord {
    fn from(movie: OmdbMovie) -> Self {
        let rotten_tomatoes = movie
            .ratings
            .into_iter()
            .find(|r| r.source == ROTTEN_TOMATOES)
            .map(|r| r.value);

        RatingsRecord {
            title: movie.title,
            year: movie.year,
            imdb_id: movie.imdb_id,
            imdb_rating: movie.imdb_rating,
            rotten_tomatoes,
        }
    }
}

#[async_trait]
impl RatingsProvider for OmdbProvider {
    fn name(&self) -> &'static str {
        "omdb"
    }

    fn is_available(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn by_id(&self, imdb_id: &str) -> anyhow::Result<RatingsRecord> {
        debug!(imdb_id, "OMDb lookup by id");
        let movie: OmdbMovie = self
            .query(&[("i", imdb_id)])
            .await
            .with_context(|| format!("OMDb lookup for {imdb_id}"))?;
        Ok(movie.into())
    }

    async fn by_title(&self, title: &str, year: Option<u16>) -> anyhow::Result<RatingsRecord> {
        debug!(title, year = ?year, "OMDb lookup by title");
        let year_str = year.map(|y| y.to_string());
        let mut params = vec![("t", title)];
        if let Some(ref y) = year_str {
            params.push(("y", y.as_str()));
        }
        params.push(("type", "movie"));

        let movie: OmdbMovie = self
            .query(&params)
            .await
            .with_context(|| format!("OMDb lookup for {title:?}"))?;
        Ok(movie.into())
    }

    async fn search(&self, title: &str) -> anyhow::Result<Vec<RatingsSearchHit>> {
        debug!(title, "OMDb search");
        let body: OmdbSearch = self
            .query(&[("s", title), ("type", "movie")])
            .await
            .with_context(|| format!("OMDb search for {title:?}"))?;

        Ok(body
            .search
            .into_iter()
            .filter_map(|item| {
                item.title.map(|title| RatingsSearchHit {
                    title,
                    year: item.year,
                    imdb_id: item.imdb_id,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::stub::{Reply, StubFetcher};
    use serde_json::json;

    const BASE: &str = "https://omdb.test/";

    fn provider(fetcher: StubFetcher) -> (Arc<StubFetcher>, OmdbProvider) {
        let fetcher = Arc::new(fetcher);
        let p = OmdbProvider::new(fetcher.clone(), "omdb-secret".into(), BASE.into());
        (fetcher, p)
    }

    #[tokio::test]
    async fn by_id_extracts_ratings() {
        let (fetcher, p) = provider(StubFetcher::new().json(
            BASE,
            json!({
                "Title": "The Dark Knight",
                "Year": "2008",
                "imdbRating": "9.0",
                "imdbID": "tt0468569",
                "Ratings": [
                    {"Source": "Internet Movie Database", "Value": "9.0/10"},
                    {"Source": "Rotten Tomatoes", "Value": "94%"}
                ],
                "Response": "True"
            }),
        ));

        let record = p.by_id("tt0468569").await.unwrap();
        assert_eq!(record.imdb_rating.as_deref(), Some("9.0"));
        assert_eq!(record.rotten_tomatoes.as_deref(), Some("94%"));
        assert_eq!(record.year.as_deref(), Some("2008"));
        assert_eq!(
            fetcher.requested(),
            vec!["https://omdb.test/?apikey=omdb-secret&i=tt0468569"]
        );
    }

    #[tokio::test]
    async fn by_title_sends_year_and_type() {
        let (fetcher, p) = provider(StubFetcher::new().json(
            BASE,
            json!({"Title": "Heat", "Year": "1995", "imdbRating": "8.3", "Response": "True"}),
        ));

        let record = p.by_title("Heat", Some(1995)).await.unwrap();
        assert_eq!(record.rotten_tomatoes, None);
        assert_eq!(
            fetcher.requested(),
            vec!["https://omdb.test/?apikey=omdb-secret&t=Heat&y=1995&type=movie"]
        );
    }

    #[tokio::test]
    async fn false_response_surfaces_error_field() {
        let (_, p) = provider(StubFetcher::new().json(
            BASE,
            json!({"Response": "False", "Error": "Movie not found!"}),
        ));

        let err = p.by_title("Nothing", None).await.unwrap_err();
        assert!(format!("{err:#}").contains("Movie not found!"));
    }

    #[tokio::test]
    async fn search_collects_hits() {
        let (_, p) = provider(StubFetcher::new().json(
            BASE,
            json!({
                "Search": [
                    {"Title": "Heat", "Year": "1995", "imdbID": "tt0113277", "Type": "movie"},
                    {"Title": "Heat", "Year": "1986", "imdbID": "tt0093164", "Type": "movie"}
                ],
                "totalResults": "2",
                "Response": "True"
            }),
        ));

        let hits = p.search("Heat").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].imdb_id.as_deref(), Some("tt0093164"));
    }

    #[tokio::test]
    async fn errors_do_not_leak_key() {
        let (_, p) = provider(
            StubFetcher::new().route(BASE, Reply::Ok(401, r#"{"Response":"False"}"#.into())),
        );
        let err = p.by_id("tt1").await.unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("401"));
        assert!(!msg.contains("omdb-secret"));

        let (_, p) = provider(StubFetcher::new().route(BASE, Reply::Transport));
        assert!(p.search("x").await.is_err());
    }

    #[test]
    fn availability_follows_key() {
        let p = OmdbProvider::new(Arc::new(StubFetcher::new()), " ".into(), BASE.into());
        assert!(!p.is_available());
        assert_eq!(p.name(), "omdb");
    }
}
