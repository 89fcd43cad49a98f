mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./discfinder.toml",
        "~/.config/discfinder/config.toml",
        "/etc/discfinder/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Overlay provider keys and proxy URLs from the environment.
///
/// Set variables win over the file. An empty `CORS_PROXY_URL` disables the
/// bypass retry.
pub fn apply_env_overrides(config: &mut Config) {
    if let Ok(key) = std::env::var("TMDB_API_KEY") {
        config.providers.tmdb_api_key = Some(key);
    }
    if let Ok(key) = std::env::var("OMDB_API_KEY") {
        config.providers.omdb_api_key = Some(key);
    }
    if let Ok(url) = std::env::var("UPC_PROXY_URL") {
        config.upc.proxy_url = Some(url).filter(|u| !u.trim().is_empty());
    }
    if let Ok(url) = std::env::var("CORS_PROXY_URL") {
        config.upc.cors_proxy = Some(url).filter(|u| !u.trim().is_empty());
    }

    tracing::debug!(
        tmdb = usable_key(&config.providers.tmdb_api_key).is_some(),
        omdb = usable_key(&config.providers.omdb_api_key).is_some(),
        "Provider key status"
    );
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.http.timeout_secs == 0 {
        anyhow::bail!("HTTP timeout must be at least 1 second");
    }

    check_url("providers.tmdb_base_url", &config.providers.tmdb_base_url)?;
    check_url("providers.omdb_base_url", &config.providers.omdb_base_url)?;
    check_url("upc.upcitemdb_base_url", &config.upc.upcitemdb_base_url)?;

    // A blank proxy URL disables that proxy
    if let Some(url) = config.upc.proxy_url.as_deref().filter(|u| !u.trim().is_empty()) {
        check_url("upc.proxy_url", url)?;
    }
    if let Some(url) = config.upc.cors_proxy.as_deref().filter(|u| !u.trim().is_empty()) {
        check_url("upc.cors_proxy", url)?;
    }

    for site in &config.upc.open_data {
        check_url(&format!("upc.open_data '{}'", site.name), &site.base_url)?;
    }

    for site in &config.upc.scrape {
        if !site.url_template.contains("{barcode}") {
            anyhow::bail!(
                "Scrape site '{}' url_template has no {{barcode}} placeholder",
                site.name
            );
        }
    }

    Ok(())
}

fn check_url(field: &str, value: &str) -> Result<()> {
    let url = reqwest::Url::parse(value)
        .with_context(|| format!("Invalid URL for {}: {:?}", field, value))?;
    if url.cannot_be_a_base() {
        anyhow::bail!("URL for {} cannot be used as a base: {:?}", field, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        for var in ["TMDB_API_KEY", "OMDB_API_KEY", "UPC_PROXY_URL", "CORS_PROXY_URL"] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        validate_config(&config).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.upc.open_data.len(), 2);
        assert_eq!(config.upc.scrape.len(), 2);
        assert!(config.upc.cors_proxy.is_some());
    }

    #[test]
    #[serial]
    fn parses_toml_file() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9000

[providers]
tmdb_api_key = "abc"

[upc]
cors_proxy = "https://bypass.example.com/raw"

[upc.overrides]
"012345678905" = "Heat"
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.providers.tmdb_api_key.as_deref(), Some("abc"));
        assert_eq!(config.providers.tmdb_base_url, "https://api.themoviedb.org/3");
        assert_eq!(
            config.upc.overrides.get("012345678905").map(String::as_str),
            Some("Heat")
        );
        assert_eq!(
            config.upc.cors_proxy.as_deref(),
            Some("https://bypass.example.com/raw")
        );
    }

    #[test]
    #[serial]
    fn env_overrides_file_values() {
        clear_env();
        std::env::set_var("TMDB_API_KEY", "from-env");
        std::env::set_var("CORS_PROXY_URL", "");

        let mut config = Config::default();
        config.providers.tmdb_api_key = Some("from-file".into());
        apply_env_overrides(&mut config);

        assert_eq!(config.providers.tmdb_api_key.as_deref(), Some("from-env"));
        assert!(config.upc.cors_proxy.is_none());
        clear_env();
    }

    #[test]
    fn rejects_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_bad_urls() {
        let mut config = Config::default();
        config.providers.tmdb_base_url = "not a url".into();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("tmdb_base_url"));
    }

    #[test]
    fn rejects_template_without_placeholder() {
        let mut config = Config::default();
        config.upc.scrape.push(ScrapeSite {
            name: "broken".into(),
            url_template: "https://example.com/lookup".into(),
        });
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn usable_key_ignores_blank() {
        assert_eq!(usable_key(&None), None);
        assert_eq!(usable_key(&Some("  ".into())), None);
        assert_eq!(usable_key(&Some(" k ".into())), Some("k"));
    }
}
