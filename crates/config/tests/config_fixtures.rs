//! Integration tests for parsing config fixtures.

use codescope_config::{
    CURRENT_CONFIG_VERSION, DEFAULT_IDENTITY_BASE_URL, LogFormat, LogLevelSetting,
    parse_client_config_json, parse_client_config_toml,
};
use codescope_shared::ErrorCode;
use std::error::Error;
use std::fs;
use std::path::Path;

fn read_fixture(name: &str) -> Result<String, Box<dyn Error>> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    Ok(fs::read_to_string(path)?)
}

#[test]
fn parses_valid_json_fixture_and_normalizes() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("client-config.valid.json")?;
    let config = parse_client_config_json(&contents)?;

    assert_eq!(config.version, CURRENT_CONFIG_VERSION);
    assert_eq!(config.api.base_url, "http://localhost:8000");
    assert_eq!(config.limits().api_timeout_ms.get(), 45_000);
    assert_eq!(config.export.output_dir, "exports", "output dir should be trimmed");
    assert_eq!(config.limits().indexing_tick_interval_ms.get(), 250);
    assert_eq!(config.limits().indexing_step.get(), 20);
    assert_eq!(config.log.level, LogLevelSetting::Warn);
    assert_eq!(config.log.format, LogFormat::Json);
    assert_eq!(config.identity.base_url, DEFAULT_IDENTITY_BASE_URL);
    Ok(())
}

#[test]
fn parses_valid_toml_fixture() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("client-config.valid.toml")?;
    let config = parse_client_config_toml(&contents)?;

    assert_eq!(config.api.base_url, "https://search.example.com");
    assert_eq!(config.limits().identity_timeout_ms.get(), 5_000);
    assert_eq!(config.log.format, LogFormat::Text);
    Ok(())
}

#[test]
fn rejects_unsupported_version() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("client-config.invalid-version.json")?;
    let error = parse_client_config_json(&contents)
        .err()
        .ok_or_else(|| std::io::Error::other("expected a version error"))?;

    assert_eq!(error.code, ErrorCode::new("config", "unsupported_version"));
    assert_eq!(error.metadata.get("found").map(String::as_str), Some("2"));
    Ok(())
}
