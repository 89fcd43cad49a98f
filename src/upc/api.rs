//! JSON product APIs: the optional UPC proxy, UPCitemdb, and Open*Facts
//! style databases.

use std::sync::Arc;

use async_trait::async_trait;
use discfinder_common::Error;
use serde::Deserialize;
use serde_json::Value;

use super::UpcSource;
use crate::config::OpenDataSite;
use crate::http::{encode_component, get_with_bypass, url_with_params, HttpFetch, HttpResponse};

#[derive(Debug, Deserialize)]
struct ItemTitle {
    title: Option<String>,
}

fn first_item_title(items: &[ItemTitle]) -> Option<String> {
    items.first().and_then(|i| i.title.clone())
}

// ---------------------------------------------------------------------------
// UPC proxy
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ProxyResponse {
    #[serde(default)]
    ok: bool,
    title: Option<String>,
    #[serde(default)]
    items: Vec<ItemTitle>,
    error: Option<String>,
}

/// A deployment of this server's own `/upc` route (or anything speaking the
/// same `{ok, title, items}` shape).
pub struct ProxySource {
    fetcher: Arc<dyn HttpFetch>,
    proxy_url: String,
    cors_proxy: Option<String>,
}

impl ProxySource {
    pub fn new(fetcher: Arc<dyn HttpFetch>, proxy_url: String, cors_proxy: Option<String>) -> Self {
        Self {
            fetcher,
            proxy_url,
            cors_proxy,
        }
    }
}

#[async_trait]
impl UpcSource for ProxySource {
    fn label(&self) -> &str {
        "upc_proxy"
    }

    async fn lookup(&self, barcode: &str) -> anyhow::Result<Option<String>> {
        let url = url_with_params(&self.proxy_url, &[("upc", barcode)])?;
        let resp = get_with_bypass(self.fetcher.as_ref(), self.cors_proxy.as_deref(), &url)
            .await?
            .ensure_success()?;

        let body: ProxyResponse = resp.json()?;
        if !body.ok {
            anyhow::bail!(
                "proxy reported failure: {}",
                body.error.as_deref().unwrap_or("unknown error")
            );
        }

        Ok(body.title.or_else(|| first_item_title(&body.items)))
    }
}

// ---------------------------------------------------------------------------
// UPCitemdb
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct UpcItemDbResponse {
    #[serde(default)]
    items: Vec<Value>,
}

/// UPCitemdb trial lookup API.
pub struct UpcItemDbSource {
    fetcher: Arc<dyn HttpFetch>,
    base_url: String,
    cors_proxy: Option<String>,
}

impl UpcItemDbSource {
    pub fn new(fetcher: Arc<dyn HttpFetch>, base_url: String, cors_proxy: Option<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            cors_proxy,
        }
    }

    fn lookup_url(&self, barcode: &str) -> discfinder_common::Result<String> {
        url_with_params(
            &format!("{}/prod/trial/lookup", self.base_url),
            &[("upc", barcode)],
        )
    }

    /// Direct request for the raw item list, without the bypass retry.
    ///
    /// Fails with [`Error::Status`] when UPCitemdb answers non-2xx so the
    /// caller can pass the upstream status through.
    pub async fn fetch_items(&self, barcode: &str) -> discfinder_common::Result<Vec<Value>> {
        let url = self.lookup_url(barcode)?;
        let resp = self.fetcher.get(&url).await?.ensure_success()?;
        parse_items(&resp)
    }
}

fn parse_items(resp: &HttpResponse) -> discfinder_common::Result<Vec<Value>> {
    let body: UpcItemDbResponse = resp.json()?;
    Ok(body.items)
}

/// Title of the first item in a UPCitemdb item list.
pub fn title_of_first(items: &[Value]) -> Option<String> {
    items
        .first()
        .and_then(|item| item.get("title"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl UpcSource for UpcItemDbSource {
    fn label(&self) -> &str {
        "upcitemdb"
    }

    async fn lookup(&self, barcode: &str) -> anyhow::Result<Option<String>> {
        let url = self.lookup_url(barcode)?;
        let resp = get_with_bypass(self.fetcher.as_ref(), self.cors_proxy.as_deref(), &url)
            .await?
            .ensure_success()?;
        Ok(title_of_first(&parse_items(&resp)?))
    }
}

// ---------------------------------------------------------------------------
// Open Products Facts / Open Food Facts
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OpenDataResponse {
    #[serde(default)]
    status: i64,
    product: Option<OpenDataProduct>,
}

#[derive(Debug, Deserialize)]
struct OpenDataProduct {
    product_name: Option<String>,
    product_name_en: Option<String>,
    generic_name: Option<String>,
}

/// A site serving `/api/v0/product/{barcode}.json`.
pub struct OpenProductDataSource {
    fetcher: Arc<dyn HttpFetch>,
    site: OpenDataSite,
    cors_proxy: Option<String>,
}

impl OpenProductDataSource {
    pub fn new(fetcher: Arc<dyn HttpFetch>, site: OpenDataSite, cors_proxy: Option<String>) -> Self {
        Self {
            fetcher,
            site,
            cors_proxy,
        }
    }
}

#[async_trait]
impl UpcSource for OpenProductDataSource {
    fn label(&self) -> &str {
        &self.site.name
    }

    async fn lookup(&self, barcode: &str) -> anyhow::Result<Option<String>> {
        let url = format!(
            "{}/api/v0/product/{}.json",
            self.site.base_url.trim_end_matches('/'),
            encode_component(barcode)
        );
        let resp = get_with_bypass(self.fetcher.as_ref(), self.cors_proxy.as_deref(), &url)
            .await?
            .ensure_success()?;

        let body: OpenDataResponse = resp.json()?;
        if body.status != 1 {
            return Ok(None);
        }

        let Some(product) = body.product else {
            return Err(Error::decode("status 1 without a product").into());
        };

        Ok([
            product.product_name,
            product.product_name_en,
            product.generic_name,
        ]
        .into_iter()
        .flatten()
        .find(|name| !name.trim().is_empty()))
    }
}
