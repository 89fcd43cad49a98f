//! Metadata provider system for turning a product title into movie details.
//!
//! This module defines the provider traits and shared data types used by the
//! resolver to query external services.
//!
//! # Module layout
//!
//! - [`provider`] -- Trait definitions and shared data types.
//! - [`providers`] -- Concrete provider implementations (TMDb, OMDb).

pub mod provider;
pub mod providers;

pub use provider::{
    AlternativeTitle, MetadataProvider, MovieDetails, RatingsProvider, RatingsRecord,
    RatingsSearchHit, SearchResult,
};
pub use providers::{OmdbProvider, TmdbProvider};
