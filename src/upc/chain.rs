//! Ordered UPC strategies with a "first success wins" policy.

use std::future::Future;
use std::sync::Arc;

use discfinder_common::{Stage, Trace};
use tracing::info;

use super::api::{OpenProductDataSource, ProxySource, UpcItemDbSource};
use super::overrides::LocalOverrideSource;
use super::scrape::HtmlScrapeSource;
use super::UpcSource;
use crate::config::UpcConfig;
use crate::http::HttpFetch;

/// The title found for a barcode and the source that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcHit {
    pub title: String,
    pub source_label: String,
}

/// Try `attempt` on each candidate in order and return the first `Ok(Some)`.
///
/// Candidates after the winner are never attempted. `on_miss` is called for
/// every candidate that failed (`Some(err)`) or produced nothing (`None`).
pub async fn first_success<T, O, F, Fut, M>(
    candidates: impl IntoIterator<Item = T>,
    mut attempt: F,
    mut on_miss: M,
) -> Option<(T, O)>
where
    T: Copy,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = anyhow::Result<Option<O>>>,
    M: FnMut(T, Option<&anyhow::Error>),
{
    for candidate in candidates {
        match attempt(candidate).await {
            Ok(Some(found)) => return Some((candidate, found)),
            Ok(None) => on_miss(candidate, None),
            Err(e) => on_miss(candidate, Some(&e)),
        }
    }
    None
}

/// Ordered list of [`UpcSource`] strategies.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use discfinder::upc::{LocalOverrideSource, UpcChain};
/// use discfinder_common::Trace;
///
/// # tokio_test::block_on(async {
/// let mut chain = UpcChain::new();
/// chain.register(Arc::new(LocalOverrideSource::builtin()));
///
/// let mut trace = Trace::new();
/// let hit = chain.resolve("043396275294", &mut trace).await.unwrap();
/// assert_eq!(hit.title, "Casino Royale");
/// assert_eq!(hit.source_label, "local_override");
/// # });
/// ```
pub struct UpcChain {
    sources: Vec<Arc<dyn UpcSource>>,
}

impl UpcChain {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Append a source; it is tried after every source registered before it.
    pub fn register(&mut self, source: Arc<dyn UpcSource>) {
        self.sources.push(source);
    }

    pub fn labels(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.label()).collect()
    }

    /// Build the default chain: proxy (if configured), UPCitemdb, open-data
    /// sites, scraped pages, then the local override table.
    pub fn from_config(config: &UpcConfig, fetcher: Arc<dyn HttpFetch>) -> Self {
        let cors = config.cors_proxy.clone().filter(|p| !p.trim().is_empty());
        let mut chain = Self::new();

        if let Some(proxy) = config.proxy_url.as_deref().filter(|p| !p.trim().is_empty()) {
            chain.register(Arc::new(ProxySource::new(
                fetcher.clone(),
                proxy.to_string(),
                cors.clone(),
            )));
        }

        chain.register(Arc::new(UpcItemDbSource::new(
            fetcher.clone(),
            config.upcitemdb_base_url.clone(),
            cors.clone(),
        )));

        for site in &config.open_data {
            chain.register(Arc::new(OpenProductDataSource::new(
                fetcher.clone(),
                site.clone(),
                cors.clone(),
            )));
        }

        for site in &config.scrape {
            chain.register(Arc::new(HtmlScrapeSource::new(
                fetcher.clone(),
                site.clone(),
                cors.clone(),
            )));
        }

        chain.register(Arc::new(LocalOverrideSource::with_overrides(&config.overrides)));
        chain
    }

    /// Resolve `barcode` to a product title, recording every attempt.
    pub async fn resolve(&self, barcode: &str, trace: &mut Trace) -> Option<UpcHit> {
        let found = first_success(
            self.sources.iter(),
            |source| async move {
                let title = source.lookup(barcode).await?;
                Ok::<_, anyhow::Error>(
                    title
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty()),
                )
            },
            |source, err| match err {
                Some(e) => trace.failure(Stage::Upc, source.label(), format!("{e:#}")),
                None => trace.failure(Stage::Upc, source.label(), "no title"),
            },
        )
        .await;

        let (source, title) = found?;
        info!(barcode, source = source.label(), title = %title, "Resolved product title");
        trace.success(Stage::Upc, source.label(), title.clone());

        Some(UpcHit {
            title,
            source_label: source.label().to_string(),
        })
    }
}

impl Default for UpcChain {
    fn default() -> Self {
        Self::new()
    }
}
