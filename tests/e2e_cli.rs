//! CLI end-to-end tests
//!
//! Tests for the discfinder command-line interface. Lookups run against a
//! config whose endpoints are all unreachable, so no network is used.

mod common;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the discfinder binary with provider keys scrubbed
#[allow(deprecated)]
fn discfinder_cmd() -> Command {
    let mut cmd = Command::cargo_bin("discfinder").unwrap();
    cmd.env_remove("TMDB_API_KEY")
        .env_remove("OMDB_API_KEY")
        .env_remove("UPC_PROXY_URL")
        .env("CORS_PROXY_URL", "")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_no_args_shows_help() {
    discfinder_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    discfinder_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("discfinder "));
}

#[test]
fn test_cli_lookup_help() {
    discfinder_cmd()
        .args(["lookup", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolve a single barcode"));
}

#[test]
fn test_cli_candidates() {
    discfinder_cmd()
        .args(["candidates", "The Dark Knight (Two-Disc Special Edition) DVD"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleaned: The Dark Knight"))
        .stdout(predicate::str::contains("2. The Dark Knight"));
}

#[test]
fn test_cli_validate_valid_config() {
    let temp = tempdir().unwrap();
    let config_path = temp.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[server]
port = 9090

[upc.overrides]
"012345678905" = "Heat"
"#,
    )
    .unwrap();

    discfinder_cmd()
        .args(["validate", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Barcode overrides: 1"));
}

#[test]
fn test_cli_validate_invalid_config() {
    let temp = tempdir().unwrap();
    let config_path = temp.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[[upc.scrape]]
name = "broken"
url_template = "https://example.com/lookup"
"#,
    )
    .unwrap();

    discfinder_cmd()
        .args(["validate", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("placeholder"));
}

#[test]
fn test_cli_lookup_json_offline() {
    let temp = tempdir().unwrap();
    let config_path = temp.path().join("config.toml");
    fs::write(&config_path, common::offline_config_toml()).unwrap();

    let output = discfinder_cmd()
        .args(["--config", config_path.to_str().unwrap()])
        .args(["lookup", "043396275294", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["barcode"], "043396275294");
    assert_eq!(info["title"], "Casino Royale");
    assert_eq!(info["source"], "barcode_only");
}

#[test]
fn test_cli_lookup_text_with_trace() {
    let temp = tempdir().unwrap();
    let config_path = temp.path().join("config.toml");
    fs::write(&config_path, common::offline_config_toml()).unwrap();

    discfinder_cmd()
        .args(["--config", config_path.to_str().unwrap()])
        .args(["lookup", "000000000017", "--trace"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown Title"))
        .stdout(predicate::str::contains("upc/upcitemdb"))
        .stdout(predicate::str::contains("upc/local_override"));
}
