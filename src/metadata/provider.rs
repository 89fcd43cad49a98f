//! Trait definitions and types for metadata providers.
//!
//! Two provider roles exist: the primary movie database
//! ([`MetadataProvider`], e.g. TMDb) which is searched and supplies the
//! descriptive record, and the secondary ratings source
//! ([`RatingsProvider`], e.g. OMDb) used to cross-reference extra ratings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Search results
// ---------------------------------------------------------------------------

/// A single result returned from a movie search query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Provider-specific identifier for this item (e.g. TMDb numeric ID).
    pub id: String,
    /// Display title of the item.
    pub title: String,
    /// Release date as reported by the provider (YYYY-MM-DD).
    pub release_date: Option<String>,
    /// Release year, if known.
    pub year: Option<u16>,
    /// Number of community votes; used as a popularity signal.
    pub vote_count: u64,
    /// Short synopsis / overview text.
    pub overview: Option<String>,
}

// ---------------------------------------------------------------------------
// Details
// ---------------------------------------------------------------------------

/// Full record for a single movie.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: String,
    /// Localised title.
    pub title: String,
    /// Original-language title, if the provider reports one.
    pub original_title: Option<String>,
    pub overview: Option<String>,
    /// Genre labels (e.g. "Action", "Drama").
    pub genres: Vec<String>,
    /// Exact release date as an ISO-8601 string (YYYY-MM-DD).
    pub release_date: Option<String>,
    pub year: Option<u16>,
    /// Community rating (0.0 - 10.0).
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub runtime_minutes: Option<u32>,
    pub director: Option<String>,
    /// IMDb identifier (`tt...`), used to cross-reference other providers.
    pub imdb_id: Option<String>,
    /// Regional and alternate titles.
    pub alternative_titles: Vec<AlternativeTitle>,
}

/// An alternate title for a movie, e.g. a regional release name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternativeTitle {
    pub title: String,
    /// ISO-3166-1 country code.
    pub country: Option<String>,
    /// Free-form kind, e.g. "working title" or "alternative spelling".
    pub kind: Option<String>,
}

/// Ratings returned by a secondary provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingsRecord {
    pub title: Option<String>,
    pub year: Option<String>,
    pub imdb_id: Option<String>,
    /// IMDb rating on a 10 point scale, as reported (e.g. `"8.1"` or `"N/A"`).
    pub imdb_rating: Option<String>,
    /// Rotten Tomatoes score as reported (e.g. `"94%"`).
    pub rotten_tomatoes: Option<String>,
}

/// A hit from the ratings provider's free-text search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingsSearchHit {
    pub title: String,
    /// Year string as reported; may be a range such as `"2008–2012"`.
    pub year: Option<String>,
    pub imdb_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Provider traits
// ---------------------------------------------------------------------------

/// Primary movie database.
///
/// Providers are shared behind an `Arc` and must be usable from many tasks.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Returns `true` when the provider has been configured with valid
    /// credentials and is ready to serve requests.
    fn is_available(&self) -> bool;

    /// Search for movies matching `title`, optionally constrained by `year`.
    ///
    /// Results are returned in provider order; scoring is the caller's job.
    async fn search_movie(
        &self,
        title: &str,
        year: Option<u16>,
    ) -> anyhow::Result<Vec<SearchResult>>;

    /// Fetch the full record for a movie identified by `provider_id`.
    async fn get_movie_details(&self, provider_id: &str) -> anyhow::Result<MovieDetails>;
}

/// Secondary ratings source.
///
/// Every method fails when the provider reports "not found"; callers treat
/// failures as "try the next strategy".
#[async_trait]
pub trait RatingsProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_available(&self) -> bool;

    /// Look up by IMDb identifier.
    async fn by_id(&self, imdb_id: &str) -> anyhow::Result<RatingsRecord>;

    /// Look up by exact title, optionally narrowed by year.
    async fn by_title(&self, title: &str, year: Option<u16>) -> anyhow::Result<RatingsRecord>;

    /// Free-text search.
    async fn search(&self, title: &str) -> anyhow::Result<Vec<RatingsSearchHit>>;
}
