//! Product titles scraped from consumer barcode lookup pages.
//!
//! The page's `og:title` is preferred over `<title>`. Bot-challenge pages are
//! rejected with [`Error::Blocked`] and generic "not found" titles count as
//! no title at all.

use std::sync::Arc;

use async_trait::async_trait;
use discfinder_common::Error;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use super::UpcSource;
use crate::config::ScrapeSite;
use crate::http::{encode_component, get_with_bypass, HttpFetch};

/// Substrings of a page title that identify a challenge page.
const BLOCKED_TITLE_MARKERS: &[&str] = &[
    "captcha",
    "just a moment",
    "attention required",
    "are you a robot",
    "access denied",
    "security check",
    "verify you are human",
];

/// Substrings of the page body that identify a challenge page.
const BLOCKED_BODY_MARKERS: &[&str] = &["cf-challenge", "challenge-platform", "cf_chl_opt"];

const NOT_FOUND_MARKERS: &[&str] = &["not found", "no results", "no result found"];

static META_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid regex"));

static OG_TITLE_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:property|name)\s*=\s*["']og:title["']"#).expect("valid regex")
});

static CONTENT_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)\bcontent\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});

static TITLE_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));

static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("valid regex"));

static LEADING_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?:upc|ean|barcode)\b[\s:#]*").expect("valid regex"));

static NOISE_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:upc|ean|barcode|lookup|search)\b").expect("valid regex"));

/// Scrapes one consumer lookup site.
pub struct HtmlScrapeSource {
    fetcher: Arc<dyn HttpFetch>,
    site: ScrapeSite,
    cors_proxy: Option<String>,
}

impl HtmlScrapeSource {
    pub fn new(fetcher: Arc<dyn HttpFetch>, site: ScrapeSite, cors_proxy: Option<String>) -> Self {
        Self {
            fetcher,
            site,
            cors_proxy,
        }
    }

    fn page_url(&self, barcode: &str) -> String {
        self.site
            .url_template
            .replace("{barcode}", &encode_component(barcode))
    }
}

#[async_trait]
impl UpcSource for HtmlScrapeSource {
    fn label(&self) -> &str {
        &self.site.name
    }

    async fn lookup(&self, barcode: &str) -> anyhow::Result<Option<String>> {
        let url = self.page_url(barcode);
        let resp = get_with_bypass(self.fetcher.as_ref(), self.cors_proxy.as_deref(), &url)
            .await?
            .ensure_success()?;

        let title = extract_title(&resp.body)?;
        debug!(site = %self.site.name, raw = ?title, "Scraped page title");
        Ok(title.and_then(|t| product_title(&t, barcode)))
    }
}

/// Pull the page title, preferring `og:title`.
///
/// Fails with [`Error::Blocked`] when the page is a bot challenge.
pub fn extract_title(html: &str) -> Result<Option<String>, Error> {
    let lower = html.to_lowercase();
    if let Some(marker) = BLOCKED_BODY_MARKERS.iter().find(|m| lower.contains(*m)) {
        return Err(Error::blocked(format!("page contains {marker:?}")));
    }

    let og = META_TAG_RE
        .find_iter(html)
        .map(|m| m.as_str())
        .filter(|tag| OG_TITLE_ATTR_RE.is_match(tag))
        .find_map(|tag| {
            CONTENT_ATTR_RE
                .captures(tag)
                .and_then(|c| c.get(1).or_else(|| c.get(2)))
                .map(|m| m.as_str().to_string())
        });
    let plain = TITLE_TAG_RE.captures(html).map(|c| c[1].to_string());

    let title = og
        .into_iter()
        .chain(plain)
        .map(|t| collapse(&decode_entities(&t)))
        .find(|t| !t.is_empty());

    if let Some(ref t) = title {
        let lower = t.to_lowercase();
        if let Some(marker) = BLOCKED_TITLE_MARKERS.iter().find(|m| lower.contains(*m)) {
            return Err(Error::blocked(format!("page title contains {marker:?}")));
        }
    }

    Ok(title)
}

/// Strip the barcode and lookup boilerplate from a page title; `None` if
/// nothing resembling a product name remains.
pub fn product_title(title: &str, barcode: &str) -> Option<String> {
    let lower = title.to_lowercase();
    if NOT_FOUND_MARKERS.iter().any(|m| lower.contains(m)) {
        return None;
    }

    let without_code = if barcode.is_empty() {
        title.to_string()
    } else {
        title.replace(barcode, " ")
    };
    let stripped = LEADING_CODE_RE.replace(&without_code, "");
    let cleaned = collapse(&stripped)
        .trim_matches(|c: char| c.is_whitespace() || "-|:#".contains(c))
        .to_string();

    let meaningful = NOISE_WORD_RE
        .replace_all(&cleaned, " ")
        .chars()
        .filter(|c| c.is_alphanumeric())
        .count();

    (meaningful >= 2).then_some(cleaned)
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode the handful of HTML entities that appear in page titles.
pub fn decode_entities(s: &str) -> String {
    ENTITY_RE
        .replace_all(s, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    _ => None,
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
