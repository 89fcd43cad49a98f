//! Barcode to product title resolution.
//!
//! A barcode is handed to an ordered list of [`UpcSource`] strategies held in
//! a [`UpcChain`]. The first source that produces a non-empty title wins and
//! no later source is consulted.
//!
//! # Module layout
//!
//! - [`chain`] -- The ordered chain and the first-success combinator.
//! - [`api`] -- JSON product APIs (UPC proxy, UPCitemdb, Open*Facts).
//! - [`scrape`] -- Title extraction from consumer lookup pages.
//! - [`overrides`] -- Static barcode to title table.

use async_trait::async_trait;

pub mod api;
pub mod chain;
pub mod overrides;
pub mod scrape;

pub use api::{OpenProductDataSource, ProxySource, UpcItemDbSource};
pub use chain::{first_success, UpcChain, UpcHit};
pub use overrides::LocalOverrideSource;
pub use scrape::HtmlScrapeSource;

/// A single way of turning a barcode into a product title.
///
/// `Ok(None)` means the source answered but had nothing usable; `Err` means
/// the attempt itself failed. The chain treats both as "try the next one".
#[async_trait]
pub trait UpcSource: Send + Sync {
    /// Stable identifier recorded in the lookup trace (e.g. `"upcitemdb"`).
    fn label(&self) -> &str;

    async fn lookup(&self, barcode: &str) -> anyhow::Result<Option<String>>;
}
