use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub upc: UpcConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Movie metadata (TMDb) and ratings (OMDb) provider settings.
///
/// A missing key never fails a lookup; it only lowers the fidelity of the
/// result.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    /// TMDb v3 API key (env: `TMDB_API_KEY`)
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// OMDb API key (env: `OMDB_API_KEY`)
    #[serde(default)]
    pub omdb_api_key: Option<String>,

    #[serde(default = "default_tmdb_base_url")]
    pub tmdb_base_url: String,

    #[serde(default = "default_omdb_base_url")]
    pub omdb_base_url: String,

    /// Language tag sent with TMDb requests
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}
fn default_omdb_base_url() -> String {
    "https://www.omdbapi.com/".to_string()
}
fn default_language() -> String {
    "en-US".to_string()
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            omdb_api_key: None,
            tmdb_base_url: default_tmdb_base_url(),
            omdb_base_url: default_omdb_base_url(),
            language: default_language(),
        }
    }
}

/// Barcode to product title resolution settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpcConfig {
    /// UPC proxy endpoint tried before every other source (env: `UPC_PROXY_URL`).
    /// Called as `{proxy_url}?upc={barcode}`.
    #[serde(default)]
    pub proxy_url: Option<String>,

    /// Generic CORS-bypass proxy used for the single retry after a request
    /// fails outright (env: `CORS_PROXY_URL`). Called as `{cors_proxy}?url={target}`.
    /// An empty string disables the retry.
    #[serde(default = "default_cors_proxy")]
    pub cors_proxy: Option<String>,

    #[serde(default = "default_upcitemdb_base_url")]
    pub upcitemdb_base_url: String,

    /// Open product-data sites, tried in order
    #[serde(default = "default_open_data")]
    pub open_data: Vec<OpenDataSite>,

    /// Consumer lookup pages scraped for a title, tried in order
    #[serde(default = "default_scrape")]
    pub scrape: Vec<ScrapeSite>,

    /// Extra barcode -> title pairs, consulted last
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

fn default_cors_proxy() -> Option<String> {
    Some("https://api.allorigins.win/raw".to_string())
}
fn default_upcitemdb_base_url() -> String {
    "https://api.upcitemdb.com".to_string()
}

fn default_open_data() -> Vec<OpenDataSite> {
    vec![
        OpenDataSite {
            name: "openproductsfacts".to_string(),
            base_url: "https://world.openproductsfacts.org".to_string(),
        },
        OpenDataSite {
            name: "openfoodfacts".to_string(),
            base_url: "https://world.openfoodfacts.org".to_string(),
        },
    ]
}

fn default_scrape() -> Vec<ScrapeSite> {
    vec![
        ScrapeSite {
            name: "scrape_upcitemdb".to_string(),
            url_template: "https://www.upcitemdb.com/upc/{barcode}".to_string(),
        },
        ScrapeSite {
            name: "scrape_barcodelookup".to_string(),
            url_template: "https://www.barcodelookup.com/{barcode}".to_string(),
        },
    ]
}

impl Default for UpcConfig {
    fn default() -> Self {
        Self {
            proxy_url: None,
            cors_proxy: default_cors_proxy(),
            upcitemdb_base_url: default_upcitemdb_base_url(),
            open_data: default_open_data(),
            scrape: default_scrape(),
            overrides: BTreeMap::new(),
        }
    }
}

/// An Open Food Facts style product database (`/api/v0/product/{barcode}.json`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenDataSite {
    pub name: String,
    pub base_url: String,
}

/// A product page whose `og:title` / `<title>` is used as the product title.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScrapeSite {
    pub name: String,
    /// URL containing a `{barcode}` placeholder
    pub url_template: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> u64 {
    30
}
fn default_user_agent() -> String {
    format!("discfinder/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Non-empty, trimmed key or `None`.
pub(crate) fn usable_key(key: &Option<String>) -> Option<&str> {
    key.as_deref().map(str::trim).filter(|k| !k.is_empty())
}
