//! Outbound HTTP capability shared by every provider.
//!
//! Providers never talk to `reqwest` directly; they receive an
//! [`HttpFetch`] implementation. Production code uses [`ReqwestFetcher`],
//! tests substitute stubs or point the fetcher at a mock server.

use std::time::Duration;

use async_trait::async_trait;
use discfinder_common::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::HttpConfig;

/// A completed HTTP exchange. Non-2xx statuses are data here, not errors.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into [`Error::Status`].
    pub fn ensure_success(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::status(self.status, self.url))
        }
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(Error::from)
    }
}

/// The single network primitive the resolver depends on.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Issue a GET. Fails with [`Error::Transport`] only when no response
    /// was received at all.
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// [`HttpFetch`] backed by a shared `reqwest` client.
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(config: &HttpConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self { client }
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(format!("GET {url}: {e}")))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::decode(format!("reading body of {url}: {e}")))?;

        debug!(url = %without_query(url), status, bytes = body.len(), "HTTP GET");

        Ok(HttpResponse {
            url: url.to_string(),
            status,
            body,
        })
    }
}

/// GET `url`, retrying once through a CORS-bypass proxy if the direct
/// request fails outright.
///
/// Only [`Error::Transport`] triggers the retry; a response with a bad
/// status is returned as-is. There is never more than one retry.
pub async fn get_with_bypass(
    fetcher: &dyn HttpFetch,
    cors_proxy: Option<&str>,
    url: &str,
) -> Result<HttpResponse> {
    match fetcher.get(url).await {
        Err(err) if err.is_transport() => {
            let Some(proxy) = cors_proxy else {
                return Err(err);
            };
            let proxied = reqwest::Url::parse_with_params(proxy, &[("url", url)])
                .map_err(|e| Error::config(format!("cors proxy {proxy:?}: {e}")))?;
            debug!(url = %without_query(url), via = %proxy, "Retrying through CORS bypass proxy");
            fetcher.get(proxied.as_str()).await
        }
        other => other,
    }
}

/// `url` with its query string removed. Query strings carry API keys, so
/// only this form is logged.
pub fn without_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

/// Build `base` with the given query parameters appended (percent-encoded).
pub fn url_with_params(base: &str, params: &[(&str, &str)]) -> Result<String> {
    reqwest::Url::parse_with_params(base, params)
        .map(String::from)
        .map_err(|e| Error::config(format!("invalid base URL {base:?}: {e}")))
}

/// Percent-encoding for a single path or query component.
pub fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

const HEX: [u8; 16] = *b"0123456789ABCDEF";
