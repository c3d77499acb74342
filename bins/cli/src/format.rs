//! Output format helpers for CLI commands.

use crate::error::{CliError, ExitCode};
use clap::{Args, ValueEnum};
use codescope_shared::ErrorEnvelope;
use serde::Serialize;
use serde_json::{Map, Value, json};

/// Output format choices for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-friendly text output.
    Text,
    /// Machine-friendly JSON output.
    Json,
    /// Line-delimited JSON (NDJSON) output.
    Ndjson,
}

/// Output-related CLI flags.
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Output format for command responses.
    #[arg(long, global = true, value_enum)]
    pub output: Option<OutputFormat>,
    /// Emit machine-friendly defaults (NDJSON output, no progress).
    #[arg(long, global = true)]
    pub agent: bool,
    /// Suppress progress and logging output.
    #[arg(long, global = true)]
    pub no_progress: bool,
}

/// Output mode derived from CLI flags.
#[derive(Debug, Clone, Copy)]
pub struct OutputMode {
    pub format: OutputFormat,
    pub no_progress: bool,
}

impl OutputMode {
    /// Build output mode from CLI flags.
    #[must_use]
    pub const fn from_args(args: &OutputArgs) -> Self {
        let format = match (args.output, args.agent) {
            (Some(value), _) => value,
            (None, true) => OutputFormat::Ndjson,
            (None, false) => OutputFormat::Text,
        };

        Self {
            format,
            no_progress: args.agent || args.no_progress,
        }
    }

    /// Returns true when JSON output is requested.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Returns true when NDJSON output is requested.
    #[must_use]
    pub const fn is_ndjson(self) -> bool {
        matches!(self.format, OutputFormat::Ndjson)
    }
}

/// Buffered result of one command.
#[derive(Debug)]
pub struct CliOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: ExitCode,
}

impl CliOutput {
    pub const fn ok(stdout: String, stderr: String) -> Self {
        Self {
            stdout,
            stderr,
            exit_code: ExitCode::Ok,
        }
    }
}

/// Pretty JSON document with a trailing newline.
pub fn json_document(value: &impl Serialize) -> Result<String, CliError> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

/// One NDJSON line tagged with `"type"`.
pub fn ndjson_line(kind: &str, value: &impl Serialize) -> Result<String, CliError> {
    let mut payload = Map::new();
    payload.insert("type".to_owned(), Value::String(kind.to_owned()));
    match serde_json::to_value(value)? {
        Value::Object(map) => payload.extend(map),
        other => {
            payload.insert("value".to_owned(), other);
        },
    }
    let mut out = serde_json::to_string(&Value::Object(payload))?;
    out.push('\n');
    Ok(out)
}

pub fn format_ndjson_summary(status: &str, kind: &str, extra: Option<Value>) -> String {
    let mut payload = Map::new();
    payload.insert("type".to_owned(), Value::String("summary".to_owned()));
    payload.insert("status".to_owned(), Value::String(status.to_owned()));
    payload.insert("kind".to_owned(), Value::String(kind.to_owned()));
    if let Some(Value::Object(map)) = extra {
        payload.extend(map);
    }
    let mut out = serde_json::to_string(&Value::Object(payload)).unwrap_or_else(|_| {
        "{\"type\":\"summary\",\"status\":\"error\",\"kind\":\"internal\"}".to_owned()
    });
    out.push('\n');
    out
}

pub fn log_info(stderr: &mut String, message: &str, no_progress: bool) {
    if no_progress {
        return;
    }
    stderr.push_str("info: ");
    stderr.push_str(message);
    stderr.push('\n');
}

fn format_error_text(error: &ErrorEnvelope) -> String {
    let mut out = String::new();
    out.push_str("status: error\n");
    out.push_str("code: ");
    out.push_str(&error.code.to_string());
    out.push('\n');
    out.push_str("message: ");
    out.push_str(&error.message);
    out.push('\n');
    out.push_str("kind: ");
    out.push_str(&error.kind.to_string());
    out.push('\n');

    if !error.metadata.is_empty() {
        out.push_str("meta:\n");
        for (key, value) in &error.metadata {
            out.push_str("  ");
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
    }
    out
}

/// Render a use-case failure in the requested format.
pub fn format_error_output(mode: OutputMode, error: &ErrorEnvelope) -> CliOutput {
    let error = error.clone().redact_secrets();

    let mut stderr = String::new();
    log_info(&mut stderr, "command failed", mode.no_progress);

    let stdout = if mode.is_ndjson() {
        let mut line = serde_json::to_string(&json!({
            "type": "error",
            "status": "error",
            "error": error,
        }))
        .unwrap_or_else(|_| {
            "{\"type\":\"error\",\"status\":\"error\",\"error\":{\"message\":\"internal error\"}}"
                .to_owned()
        });
        line.push('\n');
        line
    } else if mode.is_json() {
        let payload = json!({ "status": "error", "error": error });
        let mut output = serde_json::to_string_pretty(&payload)
            .unwrap_or_else(|_| "{\"status\":\"error\"}".to_owned());
        output.push('\n');
        output
    } else {
        format_error_text(&error)
    };

    CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::for_envelope(&error),
    }
}
