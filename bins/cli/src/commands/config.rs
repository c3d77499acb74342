//! Config command handlers.

use crate::error::CliError;
use crate::format::{CliOutput, OutputMode, format_ndjson_summary, json_document, log_info};
use clap::Subcommand;
use codescope_config::{
    client_config_schema, load_client_config_std_env, to_pretty_json, to_pretty_toml,
};
use serde_json::json;
use std::path::Path;

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective config (defaults, file, overrides, env).
    Show {
        /// Render as TOML instead of JSON in text mode.
        #[arg(long)]
        toml: bool,
    },
    /// Validate the effective config.
    Check,
    /// Print the JSON Schema of the config file.
    Schema,
}

/// Run a config subcommand.
pub fn run_config(
    mode: OutputMode,
    action: &ConfigAction,
    path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<CliOutput, CliError> {
    match action {
        ConfigAction::Show { toml } => run_show(mode, *toml, path, overrides_json),
        ConfigAction::Check => run_check(mode, path, overrides_json),
        ConfigAction::Schema => run_schema(mode),
    }
}

fn run_show(
    mode: OutputMode,
    toml: bool,
    path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<CliOutput, CliError> {
    let config = load_client_config_std_env(path, overrides_json)?;
    let mut stderr = String::new();
    log_info(&mut stderr, "config show completed", mode.no_progress);

    let stdout = if mode.is_ndjson() {
        format_ndjson_summary(
            "ok",
            "config",
            Some(json!({ "effectiveConfig": serde_json::to_value(&*config)? })),
        )
    } else if mode.is_json() {
        json_document(&json!({
            "status": "ok",
            "configPath": display_path(path),
            "effectiveConfig": serde_json::to_value(&*config)?,
        }))?
    } else {
        let rendered = if toml {
            to_pretty_toml(&config)?
        } else {
            to_pretty_json(&config)?
        };
        format!("status: ok\nconfig:\n{rendered}")
    };
    Ok(CliOutput::ok(stdout, stderr))
}

fn run_check(
    mode: OutputMode,
    path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<CliOutput, CliError> {
    load_client_config_std_env(path, overrides_json)?;
    let mut stderr = String::new();
    log_info(&mut stderr, "config check completed", mode.no_progress);

    let config_path = display_path(path);
    let stdout = if mode.is_ndjson() {
        format_ndjson_summary("ok", "config", None)
    } else if mode.is_json() {
        json_document(&json!({ "status": "ok", "configPath": config_path }))?
    } else {
        config_path.map_or_else(
            || "status: ok\nconfig: ok\n".to_owned(),
            |path| format!("status: ok\nconfig: ok\npath: {path}\n"),
        )
    };
    Ok(CliOutput::ok(stdout, stderr))
}

fn display_path(path: Option<&Path>) -> Option<String> {
    path.map(|value| value.to_string_lossy().into_owned())
}

/// The schema needs no config, so a broken file cannot hide it.
fn run_schema(mode: OutputMode) -> Result<CliOutput, CliError> {
    let schema = serde_json::to_value(client_config_schema())?;
    let stdout = if mode.is_ndjson() {
        format_ndjson_summary("ok", "config_schema", Some(json!({ "schema": schema })))
    } else {
        json_document(&schema)?
    };
    Ok(CliOutput::ok(stdout, String::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{OutputArgs, OutputFormat};
    use serde_json::Value;

    #[test]
    fn schema_lists_the_config_sections() -> Result<(), CliError> {
        let mode = OutputMode::from_args(&OutputArgs {
            output: Some(OutputFormat::Text),
            agent: false,
            no_progress: true,
        });
        let output = run_config(mode, &ConfigAction::Schema, None, Some("{not json"))?;
        let schema: Value = serde_json::from_str(&output.stdout)?;
        for section in ["api", "identity", "export", "indexing", "log"] {
            assert!(
                schema["properties"].get(section).is_some(),
                "missing section {section}"
            );
        }
        Ok(())
    }
}
