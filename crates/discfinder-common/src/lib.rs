//! Discfinder-Common: Shared types used across discfinder.
//!
//! This crate provides the pieces every other discfinder crate agrees on:
//!
//! - **Movie record**: [`MovieInfo`], the single output of a barcode lookup,
//!   and its [`Source`] provenance tag
//! - **Trace**: a bounded, typed diagnostic trail ([`Trace`]) recording every
//!   provider attempt and its outcome
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use discfinder_common::{MovieInfo, Outcome, Source, Stage, Trace};
//!
//! let mut trace = Trace::new();
//! trace.success(Stage::Upc, "local_override", "Casino Royale");
//!
//! let mut info = MovieInfo::new("043396275294", "Casino Royale", Source::BarcodeOnly);
//! info.debug = trace;
//! assert!(info.debug.has_success(Stage::Upc, "local_override"));
//! assert_eq!(info.debug.entries()[0].outcome, Outcome::Success);
//! ```

pub mod error;
pub mod movie;
pub mod trace;

pub use error::{Error, Result};
pub use movie::{MovieInfo, Source};
pub use trace::{Outcome, Stage, Trace, TraceEntry, MAX_TRACE_ENTRIES};
