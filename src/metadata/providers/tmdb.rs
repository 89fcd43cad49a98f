//! TMDB (The Movie Database) metadata provider.
//!
//! Implements [`MetadataProvider`] by querying the TMDB v3 REST API.
//!
//! Features:
//! - Token-bucket rate limiting at 4 requests / second via [`governor`].
//! - Details are fetched with credits, external IDs, and alternative titles
//!   appended, so one request yields director, IMDb ID, and title variants.

use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use serde::Deserialize;
use tracing::debug;

use crate::http::{url_with_params, HttpFetch};
use crate::metadata::provider::{AlternativeTitle, MetadataProvider, MovieDetails, SearchResult};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const REQUESTS_PER_SECOND: NonZeroU32 = match NonZeroU32::new(4) {
    Some(n) => n,
    None => panic!("rate must be non-zero"),
};

const DETAIL_APPENDS: &str = "credits,external_ids,alternative_titles";

// ---------------------------------------------------------------------------
// TMDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieSearchResult {
    id: u64,
    title: Option<String>,
    release_date: Option<String>,
    overview: Option<String>,
    vote_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetail {
    id: u64,
    title: Option<String>,
    original_title: Option<String>,
    overview: Option<String>,
    release_date: Option<String>,
    vote_average: Option<f64>,
    vote_count: Option<u64>,
    runtime: Option<u32>,
    genres: Option<Vec<TmdbGenre>>,
    imdb_id: Option<String>,
    credits: Option<TmdbCredits>,
    external_ids: Option<TmdbExternalIds>,
    alternative_titles: Option<TmdbAlternativeTitles>,
}

#[derive(Debug, Deserialize)]
struct TmdbGenre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TmdbCredits {
    #[serde(default)]
    crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Deserialize)]
struct TmdbCrewMember {
    job: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbExternalIds {
    imdb_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbAlternativeTitles {
    #[serde(default)]
    titles: Vec<TmdbAlternativeTitle>,
}

#[derive(Debug, Deserialize)]
struct TmdbAlternativeTitle {
    title: Option<String>,
    iso_3166_1: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// TMDB metadata provider.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use discfinder::config::HttpConfig;
/// use discfinder::http::ReqwestFetcher;
/// use discfinder::metadata::providers::TmdbProvider;
///
/// let fetcher = Arc::new(ReqwestFetcher::new(&HttpConfig::default()));
/// let provider = TmdbProvider::new(
///     fetcher,
///     "your-api-key".into(),
///     "en-US".into(),
///     "https://api.themoviedb.org/3".into(),
/// );
/// ```
pub struct TmdbProvider {
    fetcher: Arc<dyn HttpFetch>,
    api_key: String,
    language: String,
    base_url: String,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl TmdbProvider {
    /// Create a new TMDB provider.
    ///
    /// The `language` parameter should be a tag such as `"en-US"`. An empty
    /// `api_key` yields a provider that reports itself unavailable.
    pub fn new(
        fetcher: Arc<dyn HttpFetch>,
        api_key: String,
        language: String,
        base_url: String,
    ) -> Self {
        Self {
            fetcher,
            api_key,
            language,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::direct(Quota::per_second(REQUESTS_PER_SECOND)),
        }
    }

    /// Rate-limited GET that fails on non-2xx and decodes JSON.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> anyhow::Result<T> {
        self.rate_limiter.until_ready().await;

        let resp = self
            .fetcher
            .get(url)
            .await
            .map_err(|e| anyhow::anyhow!("TMDB request failed: {}", self.redact(&e.to_string())))?;

        if !resp.is_success() {
            anyhow::bail!(
                "TMDB returned HTTP {} for {}",
                resp.status,
                self.redact(url)
            );
        }

        Ok(resp.json()?)
    }

    /// Build a full API URL with the API key and language query parameters.
    fn url(&self, path: &str, extra_params: &[(&str, &str)]) -> anyhow::Result<String> {
        let mut params = vec![
            ("api_key", self.api_key.as_str()),
            ("language", self.language.as_str()),
        ];
        params.extend_from_slice(extra_params);
        Ok(url_with_params(&format!("{}{path}", self.base_url), &params)?)
    }

    /// Strip the API key from a URL before it is logged or recorded.
    fn redact(&self, url: &str) -> String {
        if self.api_key.is_empty() {
            url.to_string()
        } else {
            url.replace(&self.api_key, "***")
        }
    }
}

/// Extract a four-digit year from a date string like `"2023-04-15"`.
fn parse_year(date: &Option<String>) -> Option<u16> {
    date.as_deref()
        .and_then(|d| d.get(..4))
        .and_then(|y| y.parse::<u16>().ok())
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[async_trait]
impl MetadataProvider for TmdbProvider {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    fn is_available(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn search_movie(
        &self,
        title: &str,
        year: Option<u16>,
    ) -> anyhow::Result<Vec<SearchResult>> {
        let mut params = vec![("query", title)];
        let year_str = year.map(|y| y.to_string());
        if let Some(ref y) = year_str {
            params.push(("year", y.as_str()));
        }

        let url = self.url("/search/movie", &params)?;
        debug!(query = title, year = ?year, "TMDB search movie");

        let body: TmdbSearchResponse<TmdbMovieSearchResult> = self
            .get_json(&url)
            .await
            .context("failed to fetch TMDB movie search")?;

        Ok(body
            .results
            .into_iter()
            .map(|r| {
                let release_date = non_empty(r.release_date);
                SearchResult {
                    id: r.id.to_string(),
                    title: r.title.unwrap_or_default(),
                    year: parse_year(&release_date),
                    release_date,
                    vote_count: r.vote_count.unwrap_or(0),
                    overview: r.overview,
                }
            })
            .collect())
    }

    async fn get_movie_details(&self, provider_id: &str) -> anyhow::Result<MovieDetails> {
        let url = self.url(
            &format!("/movie/{provider_id}"),
            &[("append_to_response", DETAIL_APPENDS)],
        )?;
        debug!(provider_id, "TMDB get movie details");

        let detail: TmdbMovieDetail = self
            .get_json(&url)
            .await
            .context("failed to fetch TMDB movie details")?;

        let director = detail.credits.and_then(|c| {
            c.crew
                .into_iter()
                .find(|p| p.job.as_deref() == Some("Director"))
                .and_then(|p| non_empty(p.name))
        });

        let imdb_id = non_empty(detail.external_ids.and_then(|e| e.imdb_id))
            .or_else(|| non_empty(detail.imdb_id));

        let alternative_titles = detail
            .alternative_titles
            .map(|a| a.titles)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|t| {
                non_empty(t.title).map(|title| AlternativeTitle {
                    title,
                    country: t.iso_3166_1,
                    kind: non_empty(t.kind),
                })
            })
            .collect();

        let release_date = non_empty(detail.release_date);

        Ok(MovieDetails {
            id: detail.id.to_string(),
            title: detail.title.unwrap_or_default(),
            original_title: non_empty(detail.original_title),
            overview: non_empty(detail.overview),
            genres: detail
                .genres
                .unwrap_or_default()
                .into_iter()
                .map(|g| g.name)
                .collect(),
            year: parse_year(&release_date),
            release_date,
            vote_average: detail.vote_average,
            vote_count: detail.vote_count,
            runtime_minutes: detail.runtime,
            director,
            imdb_id,
            alternative_titles,
        })
    }
}
