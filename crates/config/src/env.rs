//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: a variable that is present but empty or
//! malformed fails fast instead of silently falling back to the default.
//! Secret values never appear in error metadata.

use crate::schema::{ClientConfig, LogFormat, LogLevelSetting, ValidatedClientConfig};
use codescope_shared::{ErrorCode, ErrorEnvelope, REDACTED, SecretString, is_secret_key};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// Env var: code-search service base URL.
pub const ENV_API_BASE_URL: &str = "CODESCOPE_API_BASE_URL";
/// Env var: code-search request timeout in milliseconds.
pub const ENV_API_TIMEOUT_MS: &str = "CODESCOPE_API_TIMEOUT_MS";
/// Env var: identity provider base URL.
pub const ENV_IDENTITY_BASE_URL: &str = "CODESCOPE_IDENTITY_BASE_URL";
/// Env var: identity provider API key (secret).
pub const ENV_IDENTITY_API_KEY: &str = "CODESCOPE_IDENTITY_API_KEY";
/// Env var: export output directory.
pub const ENV_EXPORT_DIR: &str = "CODESCOPE_EXPORT_DIR";
/// Env var: indexing progress tick interval in milliseconds.
pub const ENV_INDEXING_TICK_MS: &str = "CODESCOPE_INDEXING_TICK_MS";
/// Env var: minimum log level.
pub const ENV_LOG_LEVEL: &str = "CODESCOPE_LOG_LEVEL";
/// Env var: log format (`json` or `text`).
pub const ENV_LOG_FORMAT: &str = "CODESCOPE_LOG_FORMAT";

const ALL_VARS: [&str; 8] = [
    ENV_API_BASE_URL,
    ENV_API_TIMEOUT_MS,
    ENV_IDENTITY_BASE_URL,
    ENV_IDENTITY_API_KEY,
    ENV_EXPORT_DIR,
    ENV_INDEXING_TICK_MS,
    ENV_LOG_LEVEL,
    ENV_LOG_FORMAT,
];

/// Parsed environment values recognized by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientEnv {
    /// Code-search base URL override.
    pub api_base_url: Option<Box<str>>,
    /// Code-search timeout override.
    pub api_timeout_ms: Option<u64>,
    /// Identity base URL override.
    pub identity_base_url: Option<Box<str>>,
    /// Identity API key. Only ever sourced from the environment.
    pub identity_api_key: Option<SecretString>,
    /// Export directory override.
    pub export_dir: Option<Box<str>>,
    /// Progress tick override.
    pub indexing_tick_ms: Option<u64>,
    /// Log level override.
    pub log_level: Option<LogLevelSetting>,
    /// Log format override.
    pub log_format: Option<LogFormat>,
}

impl ClientEnv {
    /// Parse from a key/value map. Absent keys leave the field unset.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            api_base_url: parse_optional_url_string(map, ENV_API_BASE_URL)?,
            api_timeout_ms: parse_optional_u64(map, ENV_API_TIMEOUT_MS)?,
            identity_base_url: parse_optional_url_string(map, ENV_IDENTITY_BASE_URL)?,
            identity_api_key: parse_optional_secret(map, ENV_IDENTITY_API_KEY)?,
            export_dir: parse_optional_trimmed_string(map, ENV_EXPORT_DIR)?,
            indexing_tick_ms: parse_optional_u64(map, ENV_INDEXING_TICK_MS)?,
            log_level: parse_optional_enum(map, ENV_LOG_LEVEL, LogLevelSetting::parse)?,
            log_format: parse_optional_enum(map, ENV_LOG_FORMAT, LogFormat::parse)?,
        })
    }

    /// Parse from the process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let mut map = BTreeMap::new();
        for var in ALL_VARS {
            if let Ok(value) = std::env::var(var) {
                map.insert(var.to_owned(), value);
            }
        }
        Self::from_map(&map)
    }
}

/// Apply env overrides on top of a base config, then validate.
pub fn apply_env_overrides(
    base: ClientConfig,
    env: &ClientEnv,
) -> Result<ValidatedClientConfig, ErrorEnvelope> {
    let mut config = base;

    if let Some(url) = env.api_base_url.as_deref() {
        url.clone_into(&mut config.api.base_url);
    }
    if let Some(timeout_ms) = env.api_timeout_ms {
        config.api.timeout_ms = timeout_ms;
    }
    if let Some(url) = env.identity_base_url.as_deref() {
        url.clone_into(&mut config.identity.base_url);
    }
    if let Some(dir) = env.export_dir.as_deref() {
        dir.clone_into(&mut config.export.output_dir);
    }
    if let Some(tick_ms) = env.indexing_tick_ms {
        config.indexing.tick_interval_ms = tick_ms;
    }
    if let Some(level) = env.log_level {
        config.log.level = level;
    }
    if let Some(format) = env.log_format {
        config.log.format = format;
    }

    config.validate_and_normalize().map_err(Into::into)
}

/// Env parsing errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// A secret env var was present but empty after trimming.
    EmptySecret {
        /// Env var name.
        var: &'static str,
    },
    /// Integer env var had an invalid value.
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// URL env var had an invalid value.
    InvalidUrl {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Enum env var had an invalid value.
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } | Self::EmptySecret { .. } => {
                ErrorCode::new("config", "empty_env_var")
            },
            Self::InvalidInt { .. } => ErrorCode::new("config", "invalid_env_int"),
            Self::InvalidUrl { .. } => ErrorCode::new("config", "invalid_env_url"),
            Self::InvalidEnum { .. } => ErrorCode::new("config", "invalid_env_enum"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } | Self::EmptySecret { var } => {
                write!(formatter, "{var} must be non-empty")
            },
            Self::InvalidInt { var, .. } => write!(formatter, "{var} must be an integer"),
            Self::InvalidUrl { var, .. } => write!(formatter, "{var} must be a valid URL"),
            Self::InvalidEnum { var, .. } => write!(formatter, "{var} has an unsupported value"),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } | EnvParseError::EmptySecret { var } => {
                envelope.with_metadata("env_var", var)
            },
            EnvParseError::InvalidInt { var, value }
            | EnvParseError::InvalidUrl { var, value }
            | EnvParseError::InvalidEnum { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", redact_value(var, &value)),
        }
    }
}

fn redact_value(var: &str, value: &str) -> String {
    if is_secret_key(var) {
        REDACTED.to_owned()
    } else {
        value.to_owned()
    }
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    Ok(Some(trimmed.to_owned().into_boxed_str()))
}

fn parse_optional_secret(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<SecretString>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptySecret { var });
    }

    Ok(Some(SecretString::new(trimmed.to_owned())))
}

fn parse_optional_u64(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u64>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: raw.clone(),
        })
}

fn parse_optional_url_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some(value) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };

    let parsed = Url::parse(&value).map_err(|_| EnvParseError::InvalidUrl {
        var,
        value: value.to_string(),
    })?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(EnvParseError::InvalidUrl {
            var,
            value: value.to_string(),
        });
    }

    Ok(Some(value))
}

fn parse_optional_enum<T>(
    map: &BTreeMap<String, String>,
    var: &'static str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<Option<T>, EnvParseError> {
    let Some(value) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };

    parse(&value)
        .map(Some)
        .ok_or_else(|| EnvParseError::InvalidEnum {
            var,
            value: value.to_string(),
        })
}
