//! Individual cleanup transforms.
//!
//! Each function takes a title and returns a new string; none of them
//! depend on each other, so callers can combine them freely.

use crate::tokens::{FORMAT_RE, GENRE_RE, PARENS_RE, SEPARATORS, YEAR_RE};

/// Collapse whitespace runs to a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Punctuation that is meaningless at either end of a title, on top of
/// [`SEPARATORS`]. `+` and `&` are left behind when format tokens such as
/// "4K + Blu-ray + Digital" are stripped.
const DANGLING: &str = ":,;.+&";

/// Trim whitespace and dangling separator punctuation from both ends.
pub fn trim_dangling(s: &str) -> String {
    s.trim_matches(|c: char| c.is_whitespace() || SEPARATORS.contains(&c) || DANGLING.contains(c))
        .to_string()
}

/// Remove `( ... )` and `[ ... ]` groups.
pub fn strip_parenthetical(s: &str) -> String {
    collapse_whitespace(&PARENS_RE.replace_all(s, " "))
}

/// Remove media-format tokens ("DVD", "Blu-ray", "Special Edition", ...).
pub fn strip_format_tokens(s: &str) -> String {
    collapse_whitespace(&FORMAT_RE.replace_all(s, " "))
}

/// The text before the first run of two or more spaces.
///
/// Retail feeds often glue a base title and a descriptive suffix together
/// with wide spacing. Returns `None` when there is no such run.
pub fn base_before_wide_gap(s: &str) -> Option<&str> {
    s.trim().find("  ").map(|idx| &s.trim()[..idx])
}

/// Cut at the first separator character.
pub fn cut_at_separator(s: &str) -> Option<&str> {
    s.find(SEPARATORS).map(|idx| &s[..idx])
}

/// Cut at the earliest genre/category keyword (case-insensitive substring).
pub fn cut_at_genre(s: &str) -> Option<&str> {
    GENRE_RE.find(s).map(|m| &s[..m.start()])
}

/// The first two whitespace-delimited tokens.
pub fn first_two_words(s: &str) -> String {
    s.split_whitespace().take(2).collect::<Vec<_>>().join(" ")
}

/// First four-digit year between 1900 and 2099.
pub fn extract_year(s: &str) -> Option<u16> {
    YEAR_RE.find(s).and_then(|m| m.as_str().parse().ok())
}

/// Lowercase and drop everything that is not a letter or digit.
///
/// Used to compare titles from different sources without caring about
/// punctuation, spacing, or case.
pub fn normalize_for_match(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
