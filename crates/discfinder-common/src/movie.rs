//! The lookup result record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::trace::{Stage, Trace};

/// How far the resolution pipeline got before producing a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// A movie database match was found and its details fetched.
    Tmdb,
    /// Only the product title (or nothing) is known.
    BarcodeOnly,
    /// Neither a product title nor a movie match could be found.
    TmdbNotFound,
    /// The lookup failed unexpectedly.
    Error,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Tmdb => "tmdb",
            Self::BarcodeOnly => "barcode_only",
            Self::TmdbNotFound => "tmdb_not_found",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Movie information resolved from a scanned barcode.
///
/// Descriptive fields are independently optional: each one is only filled
/// when the step that produces it succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieInfo {
    /// The scanned identifier, exactly as supplied by the caller.
    pub barcode: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    /// Primary provider score, e.g. `"7.9/10"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotten_tomatoes_rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    pub source: Source,
    #[serde(default)]
    pub debug: Trace,
}

impl MovieInfo {
    /// Create a record with only the mandatory fields set.
    pub fn new(barcode: impl Into<String>, title: impl Into<String>, source: Source) -> Self {
        Self {
            barcode: barcode.into(),
            title: title.into(),
            year: None,
            director: None,
            rating: None,
            imdb_rating: None,
            rotten_tomatoes_rating: None,
            runtime: None,
            genres: None,
            overview: None,
            source,
            debug: Trace::new(),
        }
    }

    /// The record returned when the lookup failed unexpectedly.
    pub fn error(barcode: impl Into<String>, message: &str, mut trace: Trace) -> Self {
        trace.failure(Stage::Assembly, "error", message);
        let mut info = Self::new(barcode, "Error", Source::Error);
        info.overview = Some(format!("Failed to lookup movie: {message}"));
        info.debug = trace;
        info
    }

    /// Builder-style setter for the overview text.
    pub fn with_overview(mut self, overview: impl Into<String>) -> Self {
        self.overview = Some(overview.into());
        self
    }
}
