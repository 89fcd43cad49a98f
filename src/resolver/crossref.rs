//! Cross-referencing the chosen movie against the ratings provider.

use discfinder_common::{Stage, Trace};
use discfinder_title::{extract_year, normalize_for_match};
use tracing::debug;

use crate::metadata::{MovieDetails, RatingsProvider, RatingsRecord, RatingsSearchHit};

const NOT_AVAILABLE: &str = "N/A";

/// Countries whose alternative titles are worth trying.
const PREFERRED_COUNTRIES: &[&str] = &["US", "GB", "CA", "AU"];

/// Ratings gathered from the secondary provider, already display-formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossRefRatings {
    /// `"x/10"` or `"N/A"`
    pub imdb_rating: String,
    /// Provider value (e.g. `"94%"`) or `"N/A"`
    pub rotten_tomatoes: String,
}

impl Default for CrossRefRatings {
    fn default() -> Self {
        Self {
            imdb_rating: NOT_AVAILABLE.to_string(),
            rotten_tomatoes: NOT_AVAILABLE.to_string(),
        }
    }
}

impl From<RatingsRecord> for CrossRefRatings {
    fn from(record: RatingsRecord) -> Self {
        let imdb_rating = record
            .imdb_rating
            .filter(|r| !r.is_empty() && r != NOT_AVAILABLE)
            .map(|r| format!("{r}/10"))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let rotten_tomatoes = record
            .rotten_tomatoes
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Self {
            imdb_rating,
            rotten_tomatoes,
        }
    }
}

/// Title, original title, then preferred alternative titles, deduplicated.
pub fn title_variants(details: &MovieDetails) -> Vec<String> {
    let alternatives = details.alternative_titles.iter().filter(|alt| {
        let kind = alt.kind.as_deref().unwrap_or_default().to_lowercase();
        alt.country
            .as_deref()
            .is_some_and(|c| PREFERRED_COUNTRIES.contains(&c))
            || kind.contains("working")
            || kind.contains("alternative")
    });

    let mut variants: Vec<String> = Vec::new();
    let all = std::iter::once(details.title.as_str())
        .chain(details.original_title.as_deref())
        .chain(alternatives.map(|alt| alt.title.as_str()));
    for title in all {
        let title = title.trim();
        if !title.is_empty() && !variants.iter().any(|v| v == title) {
            variants.push(title.to_string());
        }
    }
    variants
}

/// Score a free-text search hit against the title that was searched.
pub fn score_search_hit(title: &str, year: Option<u16>, hit: &RatingsSearchHit) -> i32 {
    let wanted = normalize_for_match(title);
    let got = normalize_for_match(&hit.title);
    let mut score = 0;

    if wanted == got {
        score += 10;
    } else if got.starts_with(&wanted) || wanted.starts_with(&got) {
        score += 5;
    }

    let hit_year = hit.year.as_deref().and_then(extract_year);
    if let (Some(want), Some(got)) = (year, hit_year) {
        if want.abs_diff(got) <= 1 {
            score += 3;
        }
    }

    score
}

/// Look the movie up in the ratings provider, stopping at the first hit.
///
/// Order: by IMDb id, then each title variant by title and year and by title
/// alone, then a scored search per variant followed by an id lookup of the
/// best hit. Every failure is recorded and swallowed; without a usable
/// provider both ratings are `"N/A"`.
pub async fn cross_reference(
    provider: Option<&dyn RatingsProvider>,
    details: &MovieDetails,
    trace: &mut Trace,
) -> CrossRefRatings {
    let Some(provider) = provider.filter(|p| p.is_available()) else {
        trace.skipped(Stage::CrossReference, "omdb", "ratings API key not configured");
        return CrossRefRatings::default();
    };

    match find_record(provider, details, trace).await {
        Some(record) => record.into(),
        None => {
            trace.failure(Stage::CrossReference, "omdb", "no match after all attempts");
            CrossRefRatings::default()
        }
    }
}

async fn find_record(
    provider: &dyn RatingsProvider,
    details: &MovieDetails,
    trace: &mut Trace,
) -> Option<RatingsRecord> {
    if let Some(imdb_id) = details.imdb_id.as_deref() {
        match provider.by_id(imdb_id).await {
            Ok(record) => {
                trace.success(Stage::CrossReference, "omdb_by_id", imdb_id);
                return Some(record);
            }
            Err(e) => trace.failure(Stage::CrossReference, "omdb_by_id", format!("{e:#}")),
        }
    }

    let variants = title_variants(details);
    let years: Vec<Option<u16>> = match details.year {
        Some(y) => vec![Some(y), None],
        None => vec![None],
    };

    for title in &variants {
        for &year in &years {
            let label = match year {
                Some(y) => format!("{title:?} ({y})"),
                None => format!("{title:?}"),
            };
            match provider.by_title(title, year).await {
                Ok(record) => {
                    trace.success(Stage::CrossReference, "omdb_by_title", label);
                    return Some(record);
                }
                Err(e) => trace.failure(
                    Stage::CrossReference,
                    "omdb_by_title",
                    format!("{label}: {e:#}"),
                ),
            }
        }
    }

    for title in &variants {
        let hits = match provider.search(title).await {
            Ok(hits) => hits,
            Err(e) => {
                trace.failure(Stage::CrossReference, "omdb_search", format!("{title:?}: {e:#}"));
                continue;
            }
        };

        let mut best: Option<(&RatingsSearchHit, i32)> = None;
        for hit in &hits {
            let score = score_search_hit(title, details.year, hit);
            debug!(title = %title, hit = %hit.title, score, "Scored ratings search hit");
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((hit, score));
            }
        }

        let Some(imdb_id) = best.and_then(|(hit, _)| hit.imdb_id.as_deref()) else {
            trace.failure(Stage::CrossReference, "omdb_search", format!("{title:?}: no usable hit"));
            continue;
        };
        trace.success(Stage::CrossReference, "omdb_search", format!("{title:?} -> {imdb_id}"));

        match provider.by_id(imdb_id).await {
            Ok(record) => {
                trace.success(Stage::CrossReference, "omdb_search_by_id", imdb_id);
                return Some(record);
            }
            Err(e) => trace.failure(
                Stage::CrossReference,
                "omdb_search_by_id",
                format!("{imdb_id}: {e:#}"),
            ),
        }
    }

    None
}
