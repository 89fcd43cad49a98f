//! Static vocabularies used by the cleanup heuristics.

use once_cell::sync::Lazy;
use regex::Regex;

/// Media-format and packaging phrases found in retail titles.
///
/// Ordered so that longer phrases are tried before their sub-phrases
/// ("Ultra HD" before "HD", "Digital HD" before "Digital").
pub const FORMAT_PATTERNS: &[&str] = &[
    r"ultra\s+hd",
    r"blu[\s-]?ray(?:\s*\+\s*dvd)?",
    r"digital\s+(?:hd|copy|code)",
    r"(?:two|three|four|2|3|4)[\s-]disc(?:\s+set)?",
    r"(?:special|collector'?s|limited|deluxe|anniversary|extended|ultimate|unrated|theatrical|definitive|remastered)\s+edition",
    r"director'?s\s+cut",
    r"full\s*screen",
    r"widescreen",
    r"combo\s+pack",
    r"multi[\s-]format",
    r"steelbook",
    r"region\s+[0-9a-c]",
    r"unrated",
    r"remastered",
    r"4k",
    r"uhd",
    r"ntsc",
    r"pal",
    r"dvd",
    r"hd",
    r"digital",
];

/// Genre and category words that retailers append after the title.
pub const GENRE_KEYWORDS: &[&str] = &[
    "thriller",
    "comedy",
    "drama",
    "horror",
    "action",
    "adventure",
    "animation",
    "documentary",
    "romance",
    "sci-fi",
    "science fiction",
    "fantasy",
    "family",
    "western",
    "musical",
    "tv series",
    "tv show",
    "complete series",
    "season",
    "box set",
];

/// Characters that usually separate the title from a descriptive suffix.
pub const SEPARATORS: &[char] = &['-', '–', '—', '|', '/', '•', '·'];

pub(crate) static FORMAT_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = FORMAT_PATTERNS.join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("format pattern is valid")
});

pub(crate) static GENRE_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = GENRE_KEYWORDS
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i){alternation}")).expect("genre pattern is valid")
});

pub(crate) static PARENS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)|\[[^\]]*\]").expect("parens pattern is valid"));

pub(crate) static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("year pattern is valid"));
