//! Integration tests for env parsing and env-to-config merging.

use codescope_config::{
    ClientConfig, ClientEnv, ENV_API_TIMEOUT_MS, ENV_IDENTITY_API_KEY, ENV_LOG_FORMAT,
    EnvParseError, LogFormat, LogLevelSetting, apply_env_overrides,
};
use codescope_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::Path;

fn read_env_map(name: &str) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn single(var: &str, value: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(var.to_owned(), value.to_owned())])
}

#[test]
fn env_fixture_merges_into_effective_config() -> Result<(), Box<dyn Error>> {
    let env_map = read_env_map("client-env.valid.json")?;
    let env = ClientEnv::from_map(&env_map)?;

    let config = apply_env_overrides(ClientConfig::default(), &env)?;

    assert_eq!(config.api.base_url, "http://127.0.0.1:9000");
    assert_eq!(config.limits().api_timeout_ms.get(), 15_000);
    assert_eq!(config.export.output_dir, "out");
    assert_eq!(config.limits().indexing_tick_interval_ms.get(), 5);
    assert_eq!(config.log.level, LogLevelSetting::Debug);
    assert_eq!(config.log.format, LogFormat::Text);

    let key = env
        .identity_api_key
        .as_ref()
        .ok_or_else(|| std::io::Error::other("missing api key"))?;
    assert_eq!(key.expose(), "AIza-test-key");
    assert!(!format!("{env:?}").contains("AIza-test-key"));
    Ok(())
}

#[test]
fn empty_values_fail_fast() {
    let result = ClientEnv::from_map(&single(ENV_API_TIMEOUT_MS, "  "));
    assert_eq!(
        result,
        Err(EnvParseError::EmptyValue {
            var: ENV_API_TIMEOUT_MS
        })
    );

    let result = ClientEnv::from_map(&single(ENV_IDENTITY_API_KEY, ""));
    assert_eq!(
        result,
        Err(EnvParseError::EmptySecret {
            var: ENV_IDENTITY_API_KEY
        })
    );
}

#[test]
fn invalid_values_map_to_config_codes() -> Result<(), Box<dyn Error>> {
    let error = ClientEnv::from_map(&single(ENV_API_TIMEOUT_MS, "soon"))
        .err()
        .ok_or_else(|| std::io::Error::other("expected int error"))?;
    let envelope = ErrorEnvelope::from(error);
    assert_eq!(envelope.code, ErrorCode::new("config", "invalid_env_int"));
    assert_eq!(
        envelope.metadata.get("value").map(String::as_str),
        Some("soon")
    );

    let error = ClientEnv::from_map(&single(ENV_LOG_FORMAT, "xml"))
        .err()
        .ok_or_else(|| std::io::Error::other("expected enum error"))?;
    assert_eq!(
        ErrorEnvelope::from(error).code,
        ErrorCode::new("config", "invalid_env_enum")
    );

    let error = ClientEnv::from_map(&single("CODESCOPE_API_BASE_URL", "ftp://example.com"))
        .err()
        .ok_or_else(|| std::io::Error::other("expected url error"))?;
    assert_eq!(
        ErrorEnvelope::from(error).code,
        ErrorCode::new("config", "invalid_env_url")
    );
    Ok(())
}

#[test]
fn out_of_range_env_value_fails_validation() -> Result<(), Box<dyn Error>> {
    let env = ClientEnv::from_map(&single(ENV_API_TIMEOUT_MS, "5"))?;
    let error = apply_env_overrides(ClientConfig::default(), &env)
        .err()
        .ok_or_else(|| std::io::Error::other("expected timeout error"))?;

    assert_eq!(error.code, ErrorCode::new("config", "invalid_timeout"));
    assert_eq!(error.metadata.get("section").map(String::as_str), Some("api"));
    Ok(())
}
