//! Info command handler.

use crate::error::CliError;
use crate::format::{CliOutput, OutputMode, json_document};
use serde_json::{Value, json};

struct CrateVersions {
    cli: &'static str,
    app: &'static str,
    adapters: &'static str,
    config: &'static str,
    domain: &'static str,
}

impl CrateVersions {
    const fn current() -> Self {
        Self {
            cli: env!("CARGO_PKG_VERSION"),
            app: codescope_app::app_crate_version(),
            adapters: codescope_adapters::adapters_crate_version(),
            config: codescope_config::config_crate_version(),
            domain: codescope_domain::domain_crate_version(),
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": self.cli,
            "appVersion": self.app,
            "adaptersVersion": self.adapters,
            "configVersion": self.config,
            "domainVersion": self.domain,
        })
    }
}

/// Run the info command.
pub fn run_info(mode: OutputMode) -> Result<CliOutput, CliError> {
    let versions = CrateVersions::current();

    let stdout = if mode.is_ndjson() {
        let mut line = serde_json::to_string(&json!({
            "type": "summary",
            "status": "ok",
            "kind": "info",
            "build": versions.to_json(),
        }))?;
        line.push('\n');
        line
    } else if mode.is_json() {
        json_document(&json!({ "status": "ok", "build": versions.to_json() }))?
    } else {
        format!(
            "status: ok\nname: {}\nversion: {}\napp: {}\nadapters: {}\nconfig: {}\ndomain: {}\n",
            env!("CARGO_PKG_NAME"),
            versions.cli,
            versions.app,
            versions.adapters,
            versions.config,
            versions.domain,
        )
    };

    Ok(CliOutput::ok(stdout, String::new()))
}
