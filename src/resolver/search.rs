//! Scored search against the primary movie database.

use discfinder_common::{Stage, Trace};
use discfinder_title::normalize_for_match;
use tracing::debug;

use crate::metadata::{MetadataProvider, SearchResult};

/// Results with more votes than this get a small popularity bonus.
pub const POPULARITY_THRESHOLD: u64 = 50;

const EXACT_MATCH: i32 = 10;
const PREFIX_MATCH: i32 = 6;
const YEAR_MATCH: i32 = 4;
const POPULAR: i32 = 1;

/// The best search result seen so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub release_date: Option<String>,
    pub score: i32,
}

/// Score one search result against the query that produced it.
///
/// Exact normalized equality beats a prefix match in either direction; a
/// release year within one of `query_year` and a vote count above
/// [`POPULARITY_THRESHOLD`] add smaller bonuses.
pub fn score_result(query: &str, query_year: Option<u16>, result: &SearchResult) -> i32 {
    let q = normalize_for_match(query);
    let t = normalize_for_match(&result.title);
    let mut score = 0;

    if !q.is_empty() && !t.is_empty() {
        if q == t {
            score += EXACT_MATCH;
        } else if t.starts_with(&q) || q.starts_with(&t) {
            score += PREFIX_MATCH;
        }
    }

    if let (Some(want), Some(got)) = (query_year, result.year) {
        if want.abs_diff(got) <= 1 {
            score += YEAR_MATCH;
        }
    }

    if result.vote_count > POPULARITY_THRESHOLD {
        score += POPULAR;
    }

    score
}

/// Search every query and keep the single highest-scoring result.
///
/// With a year, every query is first searched constrained by that year; the
/// unconstrained pass runs only if the constrained one found nothing. A
/// result replaces the current best only on a strictly higher score, so the
/// first of several equal results wins.
pub async fn find_best(
    provider: &dyn MetadataProvider,
    queries: &[String],
    year: Option<u16>,
    trace: &mut Trace,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;

    if year.is_some() {
        search_pass(provider, queries, year, year, &mut best, trace).await;
    }
    if best.is_none() {
        search_pass(provider, queries, None, year, &mut best, trace).await;
    }

    match &best {
        Some(c) => trace.success(
            Stage::Search,
            "best_match",
            format!("{} (id {}, score {})", c.title, c.id, c.score),
        ),
        None => trace.failure(Stage::Search, "best_match", "no results for any query"),
    }

    best
}

async fn search_pass(
    provider: &dyn MetadataProvider,
    queries: &[String],
    search_year: Option<u16>,
    score_year: Option<u16>,
    best: &mut Option<Candidate>,
    trace: &mut Trace,
) {
    for query in queries {
        let results = match provider.search_movie(query, search_year).await {
            Ok(results) => results,
            Err(e) => {
                trace.failure(Stage::Search, "tmdb_search", format!("{query:?}: {e:#}"));
                continue;
            }
        };

        trace.success(
            Stage::Search,
            "tmdb_search",
            match search_year {
                Some(y) => format!("{query:?} ({y}): {} results", results.len()),
                None => format!("{query:?}: {} results", results.len()),
            },
        );

        for result in &results {
            let score = score_result(query, score_year, result);
            debug!(query = %query, title = %result.title, id = %result.id, score, "Scored search result");
            if best.as_ref().map_or(true, |b| score > b.score) {
                *best = Some(Candidate {
                    id: result.id.clone(),
                    title: result.title.clone(),
                    release_date: result.release_date.clone(),
                    score,
                });
            }
        }
    }
}
