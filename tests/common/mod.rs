//! Shared helpers for integration tests.
//!
//! Every third-party endpoint is either pointed at a [`wiremock`] server or
//! at an address nothing listens on, so tests never touch the network.

#![allow(dead_code)]

use std::sync::Arc;

use discfinder::config::{Config, OpenDataSite, ScrapeSite};
use discfinder::http::{HttpFetch, ReqwestFetcher};
use discfinder::resolver::Resolver;

/// Nothing listens here; connections are refused immediately.
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

pub const TMDB_KEY: &str = "test-tmdb-key";
pub const OMDB_KEY: &str = "test-omdb-key";

/// Config with every endpoint unreachable, no API keys and no bypass proxy.
pub fn offline_config() -> Config {
    let mut config = Config::default();
    config.providers.tmdb_base_url = format!("{UNREACHABLE}/3");
    config.providers.omdb_base_url = format!("{UNREACHABLE}/omdb/");
    config.upc.cors_proxy = None;
    config.upc.upcitemdb_base_url = UNREACHABLE.to_string();
    config.upc.open_data = vec![OpenDataSite {
        name: "openproductsfacts".to_string(),
        base_url: format!("{UNREACHABLE}/opf"),
    }];
    config.upc.scrape = vec![ScrapeSite {
        name: "scrape_test".to_string(),
        url_template: format!("{UNREACHABLE}/page/{{barcode}}"),
    }];
    config.http.timeout_secs = 5;
    config
}

/// Config with every endpoint served by the mock server at `uri`, both keys
/// set.
pub fn mock_config(uri: &str) -> Config {
    let mut config = offline_config();
    config.providers.tmdb_api_key = Some(TMDB_KEY.to_string());
    config.providers.omdb_api_key = Some(OMDB_KEY.to_string());
    config.providers.tmdb_base_url = format!("{uri}/3");
    config.providers.omdb_base_url = format!("{uri}/omdb/");
    config.upc.upcitemdb_base_url = uri.to_string();
    config.upc.open_data[0].base_url = format!("{uri}/opf");
    config.upc.scrape[0].url_template = format!("{uri}/page/{{barcode}}");
    config
}

pub fn fetcher(config: &Config) -> Arc<dyn HttpFetch> {
    Arc::new(ReqwestFetcher::new(&config.http))
}

pub fn resolver(config: &Config) -> Resolver {
    Resolver::new(config, fetcher(config)).expect("resolver")
}

/// Contents of a TOML config file equivalent to [`offline_config`].
pub fn offline_config_toml() -> String {
    format!(
        r#"
[providers]
tmdb_base_url = "{UNREACHABLE}/3"
omdb_base_url = "{UNREACHABLE}/omdb/"

[upc]
cors_proxy = ""
upcitemdb_base_url = "{UNREACHABLE}"
open_data = []
scrape = []

[http]
timeout_secs = 5
"#
    )
}
