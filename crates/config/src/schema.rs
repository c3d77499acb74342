//! Client configuration schema, defaults, validation, and normalization.
//!
//! Deserialization is strict (`deny_unknown_fields`) and every numeric
//! setting is range-checked once, producing a [`ValidatedClientConfig`]
//! that carries bounded values for the adapters.

use codescope_shared::{BoundedU64, ErrorCode, ErrorEnvelope};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Strip credentials from a URL before echoing it in an error.
fn sanitize_url_for_error(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.password().is_some() || !parsed.username().is_empty() {
                if parsed.set_username("").is_err() {
                    return "[invalid url: invalid username]".to_string();
                }
                if parsed.set_password(None).is_err() {
                    return "[invalid url: invalid password]".to_string();
                }
            }
            parsed.to_string()
        },
        Err(error) => format!("[invalid url: {error}]"),
    }
}

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Default code-search service URL.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
/// Default identity provider URL.
pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

const TIMEOUT_MIN_MS: u64 = 1_000;
const TIMEOUT_MAX_MS: u64 = 600_000;
const TIMEOUT_DEFAULT_MS: u64 = 30_000;

const TICK_MIN_MS: u64 = 1;
const TICK_MAX_MS: u64 = 60_000;
const TICK_DEFAULT_MS: u64 = 500;

const STEP_MIN: u64 = 1;
const STEP_MAX: u64 = 100;
const STEP_DEFAULT: u8 = 10;

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ClientConfig {
    /// Schema version for forward-compatible migrations.
    pub version: u32,
    /// Code-search service settings.
    pub api: ApiConfig,
    /// Identity provider settings.
    pub identity: IdentityConfig,
    /// Export settings.
    pub export: ExportConfig,
    /// Indexing progress animation settings.
    pub indexing: IndexingConfig,
    /// Logging settings.
    pub log: LogConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            api: ApiConfig::default(),
            identity: IdentityConfig::default(),
            export: ExportConfig::default(),
            indexing: IndexingConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Validate and normalize the config.
    pub fn validate_and_normalize(mut self) -> Result<ValidatedClientConfig, ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }

        self.api.base_url = normalize_base_url("api", "baseUrl", &self.api.base_url)?;
        self.identity.base_url =
            normalize_base_url("identity", "baseUrl", &self.identity.base_url)?;

        let output_dir = self.export.output_dir.trim();
        if output_dir.is_empty() {
            return Err(ConfigSchemaError::EmptyValue {
                section: "export",
                field: "outputDir",
            });
        }
        self.export.output_dir = output_dir.to_owned();

        let limits = ConfigLimits::new(&self)?;
        Ok(ValidatedClientConfig { raw: self, limits })
    }
}

/// Validated config wrapper carrying bounded numeric values.
#[derive(Debug, Clone)]
pub struct ValidatedClientConfig {
    raw: ClientConfig,
    limits: ConfigLimits,
}

impl ValidatedClientConfig {
    /// Access validated numeric bounds.
    #[must_use]
    pub const fn limits(&self) -> &ConfigLimits {
        &self.limits
    }

    /// Borrow the raw config.
    #[must_use]
    pub const fn as_ref(&self) -> &ClientConfig {
        &self.raw
    }
}

impl AsRef<ClientConfig> for ValidatedClientConfig {
    fn as_ref(&self) -> &ClientConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedClientConfig {
    type Target = ClientConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Validated numeric limits derived from the config.
#[derive(Debug, Clone, Copy)]
pub struct ConfigLimits {
    /// API request timeout (ms).
    pub api_timeout_ms: BoundedU64<TIMEOUT_MIN_MS, TIMEOUT_MAX_MS>,
    /// Identity request timeout (ms).
    pub identity_timeout_ms: BoundedU64<TIMEOUT_MIN_MS, TIMEOUT_MAX_MS>,
    /// Progress tick interval (ms).
    pub indexing_tick_interval_ms: BoundedU64<TICK_MIN_MS, TICK_MAX_MS>,
    /// Progress increment per tick (percent).
    pub indexing_step: BoundedU64<STEP_MIN, STEP_MAX>,
}

impl ConfigLimits {
    fn new(config: &ClientConfig) -> Result<Self, ConfigSchemaError> {
        Ok(Self {
            api_timeout_ms: bounded_timeout("api", "timeoutMs", config.api.timeout_ms)?,
            identity_timeout_ms: bounded_timeout(
                "identity",
                "timeoutMs",
                config.identity.timeout_ms,
            )?,
            indexing_tick_interval_ms: bounded_u64(
                "indexing",
                "tickIntervalMs",
                config.indexing.tick_interval_ms,
            )?,
            indexing_step: bounded_u64("indexing", "step", u64::from(config.indexing.step))?,
        })
    }
}

/// Parse a client config from a JSON string, applying validation and normalization.
pub fn parse_client_config_json(input: &str) -> Result<ValidatedClientConfig, ErrorEnvelope> {
    let config: ClientConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Parse a client config from a TOML string, applying validation and normalization.
pub fn parse_client_config_toml(input: &str) -> Result<ValidatedClientConfig, ErrorEnvelope> {
    let config: ClientConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// JSON Schema describing the config file.
#[must_use]
pub fn client_config_schema() -> schemars::Schema {
    schemars::schema_for!(ClientConfig)
}

/// Code-search service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ApiConfig {
    /// Base URL; endpoint paths (`/api/...`) are appended to it.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_owned(),
            timeout_ms: TIMEOUT_DEFAULT_MS,
        }
    }
}

/// Identity provider settings. The API key is only read from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct IdentityConfig {
    /// Identity Toolkit base URL.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_IDENTITY_BASE_URL.to_owned(),
            timeout_ms: TIMEOUT_DEFAULT_MS,
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ExportConfig {
    /// Directory exported Markdown files are written to.
    pub output_dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: ".".to_owned(),
        }
    }
}

/// Indexing progress animation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct IndexingConfig {
    /// Delay between progress ticks in milliseconds.
    pub tick_interval_ms: u64,
    /// Percent added per tick.
    pub step: u8,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: TICK_DEFAULT_MS,
            step: STEP_DEFAULT,
        }
    }
}

/// Minimum log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogLevelSetting {
    /// Debug and above.
    Debug,
    /// Info and above.
    #[default]
    Info,
    /// Warnings and errors.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevelSetting {
    /// Parse a level name (case-insensitive).
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Lowercase level name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log line format on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable lines.
    Text,
}

impl LogFormat {
    /// Parse a format name (case-insensitive).
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "text" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LogConfig {
    /// Minimum level.
    pub level: LogLevelSetting,
    /// Output format.
    pub format: LogFormat,
}

/// Typed validation errors for the configuration schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// The config version is not supported by this binary.
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// A timeout value is out of bounds.
    TimeoutOutOfRange {
        /// Schema section (e.g. `api`).
        section: &'static str,
        /// Field name in the config file (e.g. `timeoutMs`).
        field: &'static str,
        /// Value provided (ms).
        value_ms: u64,
        /// Minimum allowed value (ms).
        min_ms: u64,
        /// Maximum allowed value (ms).
        max_ms: u64,
    },
    /// A numeric limit is out of bounds.
    LimitOutOfRange {
        /// Schema section (e.g. `indexing`).
        section: &'static str,
        /// Field name in the config file (e.g. `step`).
        field: &'static str,
        /// Value provided.
        value: u64,
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
    },
    /// A URL is malformed or not http(s).
    InvalidUrl {
        /// Schema section.
        section: &'static str,
        /// Field name.
        field: &'static str,
        /// Offending URL (credentials stripped).
        url: String,
    },
    /// A required string is empty.
    EmptyValue {
        /// Schema section.
        section: &'static str,
        /// Field name.
        field: &'static str,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::TimeoutOutOfRange { .. } => ErrorCode::new("config", "invalid_timeout"),
            Self::LimitOutOfRange { .. } => ErrorCode::new("config", "invalid_limit"),
            Self::InvalidUrl { .. } => ErrorCode::new("config", "invalid_url"),
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_value"),
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => {
                write!(
                    formatter,
                    "unsupported config version: {found} (supported: {supported})"
                )
            },
            Self::TimeoutOutOfRange {
                section,
                field,
                value_ms,
                min_ms,
                max_ms,
            } => write!(
                formatter,
                "{section}.{field} must be between {min_ms} and {max_ms} ms (got {value_ms})"
            ),
            Self::LimitOutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => write!(
                formatter,
                "{section}.{field} must be between {min} and {max} (got {value})"
            ),
            Self::InvalidUrl { section, field, url } => {
                write!(formatter, "{section}.{field} must be an http(s) URL (got {url})")
            },
            Self::EmptyValue { section, field } => {
                write!(formatter, "{section}.{field} must be non-empty")
            },
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => envelope
                .with_metadata("found", found.to_string())
                .with_metadata("supported", supported.to_string()),
            ConfigSchemaError::TimeoutOutOfRange {
                section,
                field,
                value_ms,
                min_ms,
                max_ms,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("value_ms", value_ms.to_string())
                .with_metadata("min_ms", min_ms.to_string())
                .with_metadata("max_ms", max_ms.to_string()),
            ConfigSchemaError::LimitOutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("value", value.to_string())
                .with_metadata("min", min.to_string())
                .with_metadata("max", max.to_string()),
            ConfigSchemaError::InvalidUrl { section, field, url } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("url", url),
            ConfigSchemaError::EmptyValue { section, field } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field),
        }
    }
}

fn bounded_timeout(
    section: &'static str,
    field: &'static str,
    value_ms: u64,
) -> Result<BoundedU64<TIMEOUT_MIN_MS, TIMEOUT_MAX_MS>, ConfigSchemaError> {
    BoundedU64::try_new(value_ms).map_err(|range| ConfigSchemaError::TimeoutOutOfRange {
        section,
        field,
        value_ms: range.value,
        min_ms: range.min,
        max_ms: range.max,
    })
}

fn bounded_u64<const MIN: u64, const MAX: u64>(
    section: &'static str,
    field: &'static str,
    value: u64,
) -> Result<BoundedU64<MIN, MAX>, ConfigSchemaError> {
    BoundedU64::try_new(value).map_err(|range| ConfigSchemaError::LimitOutOfRange {
        section,
        field,
        value: range.value,
        min: range.min,
        max: range.max,
    })
}

/// Validate an http(s) URL and drop trailing slashes so paths can be appended.
fn normalize_base_url(
    section: &'static str,
    field: &'static str,
    value: &str,
) -> Result<String, ConfigSchemaError> {
    let invalid = || ConfigSchemaError::InvalidUrl {
        section,
        field,
        url: sanitize_url_for_error(value),
    };
    let trimmed = value.trim();
    let parsed = Url::parse(trimmed).map_err(|_| invalid())?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(invalid());
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid());
    }

    Ok(parsed.as_str().trim_end_matches('/').to_owned())
}
