//! # codescope-config
//!
//! Configuration schema, validation, and loading for the codescope client.
//! This crate depends on `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file + overrides).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use schema::{
    ApiConfig, CURRENT_CONFIG_VERSION, ClientConfig, ConfigLimits, ConfigSchemaError,
    DEFAULT_API_BASE_URL, DEFAULT_IDENTITY_BASE_URL, ExportConfig, IdentityConfig, IndexingConfig,
    LogConfig, LogFormat, LogLevelSetting, ValidatedClientConfig, client_config_schema,
    parse_client_config_json, parse_client_config_toml,
};

pub use env::{
    ClientEnv, ENV_API_BASE_URL, ENV_API_TIMEOUT_MS, ENV_EXPORT_DIR, ENV_IDENTITY_API_KEY,
    ENV_IDENTITY_BASE_URL, ENV_INDEXING_TICK_MS, ENV_LOG_FORMAT, ENV_LOG_LEVEL, EnvParseError,
    apply_env_overrides,
};
pub use load::{
    load_client_config_from_path, load_client_config_from_sources, load_client_config_std_env,
    to_pretty_json, to_pretty_toml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
