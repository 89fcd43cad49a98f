//! Barcode to [`MovieInfo`] resolution.
//!
//! The [`Resolver`] is the single entry point shared by the CLI and the HTTP
//! server. It owns the UPC chain and the metadata providers, all of which
//! talk to the network through one injected [`HttpFetch`].
//!
//! # Module layout
//!
//! - [`search`] -- Scored search against the primary movie database.
//! - [`crossref`] -- Ratings cross-reference against the secondary provider.

pub mod crossref;
pub mod search;

use std::sync::Arc;

use anyhow::Context;
use discfinder_common::{Error, MovieInfo, Source, Stage, Trace};
use tracing::{error, info, warn};

use crate::config::{usable_key, Config};
use crate::http::HttpFetch;
use crate::metadata::{MetadataProvider, MovieDetails, OmdbProvider, RatingsProvider, TmdbProvider};
use crate::upc::{UpcChain, UpcHit};

pub use crossref::{cross_reference, CrossRefRatings};
pub use search::{find_best, score_result, Candidate, POPULARITY_THRESHOLD};

const UNKNOWN: &str = "Unknown";
const NOT_AVAILABLE: &str = "N/A";

/// Resolves scanned barcodes to movie records.
///
/// Holds no per-lookup state; one instance is shared behind an `Arc` by every
/// request.
pub struct Resolver {
    upc: UpcChain,
    metadata: Option<Arc<dyn MetadataProvider>>,
    ratings: Option<Arc<dyn RatingsProvider>>,
}

impl Resolver {
    /// Build the production pipeline from configuration.
    ///
    /// Providers whose key is missing are left out; lookups then degrade to
    /// the `barcode_only` shape instead of failing.
    pub fn new(config: &Config, fetcher: Arc<dyn HttpFetch>) -> anyhow::Result<Self> {
        let providers = &config.providers;

        let metadata = usable_key(&providers.tmdb_api_key).map(|key| {
            Arc::new(TmdbProvider::new(
                fetcher.clone(),
                key.to_string(),
                providers.language.clone(),
                providers.tmdb_base_url.clone(),
            )) as Arc<dyn MetadataProvider>
        });
        if metadata.is_none() {
            warn!("TMDB API key not configured; lookups will return barcode data only");
        }

        let ratings = usable_key(&providers.omdb_api_key).map(|key| {
            Arc::new(OmdbProvider::new(
                fetcher.clone(),
                key.to_string(),
                providers.omdb_base_url.clone(),
            )) as Arc<dyn RatingsProvider>
        });

        let upc = UpcChain::from_config(&config.upc, fetcher);
        info!(sources = ?upc.labels(), tmdb = metadata.is_some(), omdb = ratings.is_some(), "Resolver ready");

        Ok(Self::with_parts(upc, metadata, ratings))
    }

    /// Assemble a resolver from already-built parts.
    pub fn with_parts(
        upc: UpcChain,
        metadata: Option<Arc<dyn MetadataProvider>>,
        ratings: Option<Arc<dyn RatingsProvider>>,
    ) -> Self {
        Self {
            upc,
            metadata,
            ratings,
        }
    }

    pub fn upc_chain(&self) -> &UpcChain {
        &self.upc
    }

    /// Resolve `barcode`. Never fails: unexpected errors become a record with
    /// `source: error`, and the returned `barcode` always equals the input.
    pub async fn lookup_movie(&self, barcode: &str) -> MovieInfo {
        let mut trace = Trace::new();
        match self.resolve(barcode, &mut trace).await {
            Ok(info) => info,
            Err(e) => {
                error!(barcode, "Movie lookup failed: {:#}", e);
                MovieInfo::error(barcode, &format!("{e:#}"), trace)
            }
        }
    }

    async fn resolve(&self, barcode: &str, trace: &mut Trace) -> anyhow::Result<MovieInfo> {
        let code = barcode.trim();
        if code.is_empty() {
            return Err(Error::invalid_input("barcode is empty").into());
        }

        let hit = self.upc.resolve(code, trace).await;
        let upc_title = hit
            .as_ref()
            .map(|h: &UpcHit| discfinder_title::clean::collapse_whitespace(&h.title));

        let Some(metadata) = self.metadata.as_deref().filter(|m| m.is_available()) else {
            trace.skipped(Stage::Search, "tmdb", "movie database API key not configured");
            return Ok(fallback(
                barcode,
                upc_title.as_deref().unwrap_or("Unknown Title"),
                Source::BarcodeOnly,
                "Movie database API key not configured",
                trace,
            ));
        };

        let (queries, year) = match hit.as_ref().map(|h| h.title.as_str()) {
            Some(title) => {
                let candidates = discfinder_title::candidates(title);
                if candidates.is_empty() {
                    trace.failure(Stage::Normalize, "candidates", format!("nothing usable in {title:?}"));
                    (vec![code.to_string()], candidates.year)
                } else {
                    trace.success(Stage::Normalize, "candidates", candidates.queries.join(" | "));
                    (candidates.queries, candidates.year)
                }
            }
            None => {
                trace.skipped(Stage::Normalize, "candidates", "no product title; searching by barcode");
                (vec![code.to_string()], None)
            }
        };

        let Some(best) = find_best(metadata, &queries, year, trace).await else {
            return Ok(match upc_title {
                Some(title) => fallback(
                    barcode,
                    &title,
                    Source::BarcodeOnly,
                    "No detailed movie information found",
                    trace,
                ),
                None => fallback(
                    barcode,
                    "Unknown Movie",
                    Source::TmdbNotFound,
                    "No product or movie found for this barcode",
                    trace,
                ),
            });
        };

        let details = match metadata
            .get_movie_details(&best.id)
            .await
            .with_context(|| format!("details for {} ({})", best.title, best.id))
        {
            Ok(details) => {
                trace.success(Stage::Details, "tmdb_details", format!("{} ({})", details.title, details.id));
                details
            }
            Err(e) => {
                trace.failure(Stage::Details, "tmdb_details", format!("{e:#}"));
                let title = upc_title.unwrap_or(best.title);
                return Ok(fallback(
                    barcode,
                    &title,
                    Source::BarcodeOnly,
                    "No detailed movie information found",
                    trace,
                ));
            }
        };

        let ratings = cross_reference(self.ratings.as_deref(), &details, trace).await;

        let info = assemble(barcode, &details, ratings, std::mem::take(trace));
        info!(barcode, title = %info.title, year = ?info.year, "Resolved movie");
        Ok(info)
    }
}

/// The reduced record returned whenever full details are unavailable.
fn fallback(
    barcode: &str,
    title: &str,
    source: Source,
    overview: &str,
    trace: &mut Trace,
) -> MovieInfo {
    trace.success(Stage::Assembly, source.to_string(), title);
    let mut info = MovieInfo::new(barcode, title, source).with_overview(overview);
    info.year = Some(UNKNOWN.to_string());
    info.director = Some(UNKNOWN.to_string());
    info.rating = Some(NOT_AVAILABLE.to_string());
    info.debug = std::mem::take(trace);
    info
}

/// Full `tmdb` record from provider details plus cross-referenced ratings.
fn assemble(
    barcode: &str,
    details: &MovieDetails,
    ratings: CrossRefRatings,
    mut trace: Trace,
) -> MovieInfo {
    trace.success(Stage::Assembly, Source::Tmdb.to_string(), details.title.as_str());

    let rating = match (details.vote_average, details.vote_count) {
        (Some(avg), Some(count)) if avg > 0.0 && count > 0 => format!("{avg:.1}/10"),
        _ => NOT_AVAILABLE.to_string(),
    };

    let mut info = MovieInfo::new(barcode, details.title.as_str(), Source::Tmdb);
    info.year = Some(
        details
            .year
            .map_or_else(|| UNKNOWN.to_string(), |y| y.to_string()),
    );
    info.director = Some(details.director.clone().unwrap_or_else(|| UNKNOWN.to_string()));
    info.rating = Some(rating);
    info.imdb_rating = Some(ratings.imdb_rating);
    info.rotten_tomatoes_rating = Some(ratings.rotten_tomatoes);
    info.runtime = Some(
        details
            .runtime_minutes
            .filter(|m| *m > 0)
            .map_or_else(|| UNKNOWN.to_string(), |m| format!("{m} minutes")),
    );
    info.genres = Some(if details.genres.is_empty() {
        UNKNOWN.to_string()
    } else {
        details.genres.join(", ")
    });
    info.overview = Some(
        details
            .overview
            .clone()
            .unwrap_or_else(|| "No overview available".to_string()),
    );
    info.debug = trace;
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{RatingsRecord, RatingsSearchHit, SearchResult};
    use crate::upc::LocalOverrideSource;
    use async_trait::async_trait;
    use discfinder_common::Outcome;

    struct FakeTmdb {
        results: Vec<SearchResult>,
        details: Option<MovieDetails>,
    }

    #[async_trait]
    impl MetadataProvider for FakeTmdb {
        fn name(&self) -> &'static str {
            "tmdb"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn search_movie(&self, _: &str, _: Option<u16>) -> anyhow::Result<Vec<SearchResult>> {
            Ok(self.results.clone())
        }

        async fn get_movie_details(&self, id: &str) -> anyhow::Result<MovieDetails> {
            self.details
                .clone()
                .ok_or_else(|| anyhow::anyhow!("HTTP 404 for movie {id}"))
        }
    }

    struct FixedRatings;

    #[async_trait]
    impl RatingsProvider for FixedRatings {
        fn name(&self) -> &'static str {
            "omdb"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn by_id(&self, _: &str) -> anyhow::Result<RatingsRecord> {
            Ok(RatingsRecord {
                imdb_rating: Some("8.2".into()),
                rotten_tomatoes: Some("95%".into()),
                ..Default::default()
            })
        }

        async fn by_title(&self, _: &str, _: Option<u16>) -> anyhow::Result<RatingsRecord> {
            anyhow::bail!("Movie not found!")
        }

        async fn search(&self, _: &str) -> anyhow::Result<Vec<RatingsSearchHit>> {
            anyhow::bail!("Movie not found!")
        }
    }

    fn casino_royale_result() -> SearchResult {
        SearchResult {
            id: "36557".into(),
            title: "Casino Royale".into(),
            release_date: Some("2006-11-14".into()),
            year: Some(2006),
            vote_count: 9000,
            overview: None,
        }
    }

    fn casino_royale_details() -> MovieDetails {
        MovieDetails {
            id: "36557".into(),
            title: "Casino Royale".into(),
            release_date: Some("2006-11-14".into()),
            year: Some(2006),
            vote_average: Some(7.54),
            vote_count: Some(9000),
            runtime_minutes: Some(144),
            genres: vec!["Adventure".into(), "Action".into(), "Thriller".into()],
            director: Some("Martin Campbell".into()),
            imdb_id: Some("tt0381061".into()),
            ..Default::default()
        }
    }

    fn override_chain() -> UpcChain {
        let mut chain = UpcChain::new();
        chain.register(Arc::new(LocalOverrideSource::builtin()));
        chain
    }

    #[tokio::test]
    async fn full_record_from_override_title() {
        let resolver = Resolver::with_parts(
            override_chain(),
            Some(Arc::new(FakeTmdb {
                results: vec![casino_royale_result()],
                details: Some(casino_royale_details()),
            })),
            Some(Arc::new(FixedRatings)),
        );

        let info = resolver.lookup_movie("043396275294").await;
        assert_eq!(info.source, Source::Tmdb);
        assert_eq!(info.barcode, "043396275294");
        assert_eq!(info.title, "Casino Royale");
        assert_eq!(info.year.as_deref(), Some("2006"));
        assert_eq!(info.rating.as_deref(), Some("7.5/10"));
        assert_eq!(info.imdb_rating.as_deref(), Some("8.2/10"));
        assert_eq!(info.rotten_tomatoes_rating.as_deref(), Some("95%"));
        assert_eq!(info.runtime.as_deref(), Some("144 minutes"));
        assert_eq!(info.genres.as_deref(), Some("Adventure, Action, Thriller"));
        assert_eq!(info.overview.as_deref(), Some("No overview available"));
        assert!(info.debug.has_success(Stage::Upc, "local_override"));
    }

    #[tokio::test]
    async fn no_metadata_provider_gives_barcode_only() {
        let resolver = Resolver::with_parts(UpcChain::new(), None, None);
        let info = resolver.lookup_movie("000000000000").await;

        assert_eq!(info.source, Source::BarcodeOnly);
        assert_eq!(info.title, "Unknown Title");
        assert_eq!(info.year.as_deref(), Some("Unknown"));
        assert_eq!(info.rating.as_deref(), Some("N/A"));
        assert_eq!(
            info.overview.as_deref(),
            Some("Movie database API key not configured")
        );
    }

    #[tokio::test]
    async fn no_match_without_title_is_not_found() {
        let resolver = Resolver::with_parts(
            UpcChain::new(),
            Some(Arc::new(FakeTmdb {
                results: Vec::new(),
                details: None,
            })),
            None,
        );
        let info = resolver.lookup_movie("000000000000").await;

        assert_eq!(info.source, Source::TmdbNotFound);
        assert_eq!(info.title, "Unknown Movie");
        assert_eq!(
            info.overview.as_deref(),
            Some("No product or movie found for this barcode")
        );
        assert_eq!(
            info.debug.find(Stage::Normalize, "candidates").unwrap().outcome,
            Outcome::Skipped
        );
    }

    #[tokio::test]
    async fn details_failure_keeps_upc_title() {
        let resolver = Resolver::with_parts(
            override_chain(),
            Some(Arc::new(FakeTmdb {
                results: vec![casino_royale_result()],
                details: None,
            })),
            None,
        );
        let info = resolver.lookup_movie("043396275294").await;

        assert_eq!(info.source, Source::BarcodeOnly);
        assert_eq!(info.title, "Casino Royale");
        assert_eq!(
            info.overview.as_deref(),
            Some("No detailed movie information found")
        );
        assert_eq!(
            info.debug.find(Stage::Details, "tmdb_details").unwrap().outcome,
            Outcome::Failure
        );
    }

    #[derive(Default)]
    struct RecordingTmdb {
        queries: parking_lot::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MetadataProvider for RecordingTmdb {
        fn name(&self) -> &'static str {
            "tmdb"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn search_movie(&self, query: &str, _: Option<u16>) -> anyhow::Result<Vec<SearchResult>> {
            self.queries.lock().push(query.to_string());
            Ok(Vec::new())
        }

        async fn get_movie_details(&self, id: &str) -> anyhow::Result<MovieDetails> {
            anyhow::bail!("unexpected details call for {id}")
        }
    }

    #[tokio::test]
    async fn wide_gap_base_title_reaches_search() {
        let overrides: std::collections::BTreeMap<String, String> = [(
            "1".to_string(),
            "The Dark Knight  Christian Bale Heath Ledger".to_string(),
        )]
        .into_iter()
        .collect();
        let mut chain = UpcChain::new();
        chain.register(Arc::new(LocalOverrideSource::with_overrides(&overrides)));

        let tmdb = Arc::new(RecordingTmdb::default());
        let resolver = Resolver::with_parts(chain, Some(tmdb.clone() as Arc<dyn MetadataProvider>), None);
        let info = resolver.lookup_movie("1").await;

        let sent = tmdb.queries.lock().clone();
        assert!(sent.iter().any(|q| q == "The Dark Knight"), "sent: {sent:?}");
        assert_eq!(sent[0], "The Dark Knight Christian Bale Heath Ledger");

        assert_eq!(info.source, Source::BarcodeOnly);
        assert_eq!(info.title, "The Dark Knight Christian Bale Heath Ledger");
    }

    #[tokio::test]
    async fn blank_barcode_is_an_error_record() {
        let resolver = Resolver::with_parts(UpcChain::new(), None, None);
        let info = resolver.lookup_movie("   ").await;

        assert_eq!(info.source, Source::Error);
        assert_eq!(info.barcode, "   ");
        assert_eq!(info.title, "Error");
        assert!(info
            .overview
            .as_deref()
            .unwrap()
            .starts_with("Failed to lookup movie: "));
        assert!(info.debug.find(Stage::Assembly, "error").is_some());
    }

    #[test]
    fn rating_needs_votes() {
        let mut details = casino_royale_details();
        details.vote_count = Some(0);
        details.runtime_minutes = None;
        details.genres.clear();
        details.director = None;
        details.year = None;

        let info = assemble("1", &details, CrossRefRatings::default(), Trace::new());
        assert_eq!(info.rating.as_deref(), Some("N/A"));
        assert_eq!(info.runtime.as_deref(), Some("Unknown"));
        assert_eq!(info.genres.as_deref(), Some("Unknown"));
        assert_eq!(info.director.as_deref(), Some("Unknown"));
        assert_eq!(info.year.as_deref(), Some("Unknown"));
        assert_eq!(info.imdb_rating.as_deref(), Some("N/A"));
    }
}
