//! # discfinder-title
//!
//! Turns one noisy retail product title into several plausible search
//! queries for a movie database.
//!
//! Retail titles embed format tags, edition names, genre noise, and
//! concatenated descriptive fields that defeat exact-match search. Rather
//! than guessing which cleanup is right, [`candidates`] applies a handful of
//! independent heuristics and returns every distinct result; the caller
//! searches with all of them and lets scoring pick the winner.
//!
//! ## Quick Start
//!
//! ```
//! use discfinder_title::candidates;
//!
//! let result = candidates("The Dark Knight (Two-Disc Special Edition) DVD");
//!
//! assert!(result.queries.iter().any(|q| q == "The Dark Knight"));
//! assert_eq!(result.cleaned, "The Dark Knight");
//! assert_eq!(result.year, None);
//! ```

pub mod clean;
pub mod tokens;

pub use clean::{extract_year, normalize_for_match};

/// Minimum length, in characters, for a query to be kept.
pub const MIN_QUERY_CHARS: usize = 2;

/// Search queries derived from a single product title.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TitleCandidates {
    /// Distinct queries in generation order. Never contains strings shorter
    /// than [`MIN_QUERY_CHARS`].
    pub queries: Vec<String>,
    /// Release year found in the raw or cleaned title.
    pub year: Option<u16>,
    /// The title with parenthetical content and format tokens removed.
    pub cleaned: String,
}

impl TitleCandidates {
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// Derive search queries from a product title.
///
/// Candidates are produced in this order, each by an independent rule:
///
/// 1. parenthetical / bracketed content stripped
/// 2. media-format tokens stripped as well (the "cleaned" title)
/// 3. the base title before the first wide gap, cleaned
/// 4. the cleaned title cut at the first separator character
/// 5. the cleaned title cut at the first genre keyword
/// 6. the first two words of the cleaned title
///
/// Empty and one-character results are dropped, then duplicates, keeping
/// the first occurrence.
pub fn candidates(raw: &str) -> TitleCandidates {
    let no_parens = clean::strip_parenthetical(raw);
    let cleaned = clean::trim_dangling(&clean::strip_format_tokens(&no_parens));

    let mut generated: Vec<String> = vec![no_parens.clone(), cleaned.clone()];

    if let Some(base) = clean::base_before_wide_gap(raw) {
        generated.push(clean::strip_format_tokens(&clean::strip_parenthetical(base)));
    }
    if let Some(head) = clean::cut_at_separator(&cleaned) {
        generated.push(head.to_string());
    }
    if let Some(head) = clean::cut_at_genre(&cleaned) {
        generated.push(head.to_string());
    }
    generated.push(clean::first_two_words(&cleaned));

    let mut queries: Vec<String> = Vec::with_capacity(generated.len());
    for candidate in generated {
        let candidate = clean::trim_dangling(&clean::collapse_whitespace(&candidate));
        if candidate.chars().count() < MIN_QUERY_CHARS {
            continue;
        }
        if !queries.contains(&candidate) {
            queries.push(candidate);
        }
    }

    let year = clean::extract_year(raw).or_else(|| clean::extract_year(&cleaned));

    TitleCandidates {
        queries,
        year,
        cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_knight_special_edition() {
        let result = candidates("The Dark Knight (Two-Disc Special Edition) DVD");
        assert_eq!(
            result.queries,
            vec!["The Dark Knight DVD", "The Dark Knight", "The Dark"]
        );
    }

    #[test]
    fn wide_gap_base_title() {
        let result = candidates("Casino Royale  Daniel Craig Eva Green Widescreen");
        assert_eq!(result.queries[0], "Casino Royale Daniel Craig Eva Green Widescreen");
        assert_eq!(result.queries[1], "Casino Royale Daniel Craig Eva Green");
        assert!(result.queries.contains(&"Casino Royale".to_string()));
    }

    #[test]
    fn separator_and_genre_cuts() {
        let result = candidates("Heat - Al Pacino Robert De Niro Crime Thriller Blu-ray");
        assert!(result.queries.contains(&"Heat".to_string()));
        assert!(result
            .queries
            .contains(&"Heat - Al Pacino Robert De Niro Crime".to_string()));
    }

    #[test]
    fn combo_pack_leaves_no_plus_signs() {
        let result = candidates("Inception 4K Ultra HD + Blu-ray + Digital");
        assert_eq!(result.cleaned, "Inception");
        assert!(result.queries.contains(&"Inception".to_string()));
        assert!(result.queries.iter().all(|q| !q.ends_with('+')));
    }

    #[test]
    fn year_from_raw_title() {
        let result = candidates("Casino Royale (2006) Blu-ray");
        assert_eq!(result.year, Some(2006));
        assert_eq!(result.cleaned, "Casino Royale");
    }

    #[test]
    fn already_clean_title_yields_itself_first() {
        let result = candidates("Casino Royale");
        assert_eq!(result.queries, vec!["Casino Royale"]);
        assert_eq!(result.cleaned, "Casino Royale");
    }

    #[test]
    fn drops_short_and_empty_queries() {
        let result = candidates("[Blu-ray] (Widescreen)");
        assert!(result.is_empty());

        let result = candidates("X DVD");
        assert!(result.queries.iter().all(|q| q.chars().count() >= MIN_QUERY_CHARS));
    }

    #[test]
    fn genre_at_start_does_not_produce_empty_query() {
        let result = candidates("Drama Collection Vol 1");
        assert!(!result.queries.iter().any(|q| q.is_empty()));
        assert_eq!(result.queries[0], "Drama Collection Vol 1");
    }

    #[test]
    fn queries_are_unique() {
        let result = candidates("Alien - Alien - Alien");
        let mut sorted = result.queries.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), result.queries.len());
    }
}
