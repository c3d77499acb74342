//! Code snippet command handlers.

use crate::error::CliError;
use crate::format::{CliOutput, OutputMode, format_ndjson_summary, json_document, log_info};
use crate::runtime::ClientRuntime;
use clap::Subcommand;
use codescope_app::{ExportData, explain_snippet, export_markdown, load_code_snippet};
use codescope_domain::{CodeSnippetDetail, SnippetId, copy_with_attribution};
use codescope_shared::ErrorEnvelope;
use serde_json::json;

#[derive(Debug, Subcommand)]
pub enum CodeAction {
    /// Show a snippet with its repository and file.
    Show {
        /// Snippet id.
        id: String,
        /// Print the code followed by a `Source:` line, ready to paste.
        #[arg(long)]
        copy: bool,
    },
    /// Ask the service to explain a snippet.
    Explain {
        /// Snippet id.
        id: String,
    },
    /// Export a snippet as Markdown (`.md` is appended to the name).
    Export {
        /// Snippet id.
        id: String,
        /// File name without extension. Defaults to `code-snippet-<id>`.
        #[arg(long)]
        name: Option<String>,
    },
}

/// Run a code subcommand.
pub async fn run_code(
    mode: OutputMode,
    runtime: &ClientRuntime,
    action: &CodeAction,
) -> Result<CliOutput, CliError> {
    let deps = runtime.code_search_deps()?;
    match action {
        CodeAction::Show { id, copy } => {
            let snippet = load_code_snippet(&runtime.ctx, &deps, parse_id(id)?).await?;
            let stdout = if mode.is_ndjson() {
                format_ndjson_summary("ok", "code", Some(json!({ "snippet": snippet })))
            } else if mode.is_json() {
                json_document(&json!({ "status": "ok", "snippet": snippet }))?
            } else if *copy {
                let mut out = copy_with_attribution(&snippet.code, &snippet.file_path);
                out.push('\n');
                out
            } else {
                format_snippet_text(&snippet)
            };
            Ok(CliOutput::ok(stdout, String::new()))
        },
        CodeAction::Explain { id } => {
            let explanation = explain_snippet(&runtime.ctx, &deps, parse_id(id)?).await?;
            let stdout = if mode.is_ndjson() {
                format_ndjson_summary(
                    "ok",
                    "explain",
                    Some(json!({ "explanation": explanation.explanation })),
                )
            } else if mode.is_json() {
                json_document(&json!({
                    "status": "ok",
                    "explanation": explanation.explanation,
                }))?
            } else {
                format!("status: ok\nexplanation:\n{}\n", explanation.explanation)
            };
            Ok(CliOutput::ok(stdout, String::new()))
        },
        CodeAction::Export { id, name } => {
            let snippet = load_code_snippet(&runtime.ctx, &deps, parse_id(id)?).await?;
            let name = name
                .clone()
                .unwrap_or_else(|| format!("code-snippet-{}", snippet.id));
            let data = ExportData::CodeSnippet(snippet);
            let outcome = export_markdown(&runtime.export_deps(), "code", Some(&data), &name)?;

            let mut stderr = String::new();
            log_info(&mut stderr, "code export completed", mode.no_progress);
            let location = &*outcome.receipt.location;
            let stdout = if mode.is_ndjson() {
                format_ndjson_summary(
                    "ok",
                    "export",
                    Some(json!({
                        "location": location,
                        "bytesWritten": outcome.receipt.bytes_written,
                    })),
                )
            } else if mode.is_json() {
                json_document(&json!({
                    "status": "ok",
                    "location": location,
                    "bytesWritten": outcome.receipt.bytes_written,
                }))?
            } else {
                format!("status: ok\nexported: {location}\n")
            };
            Ok(CliOutput::ok(stdout, stderr))
        },
    }
}

fn parse_id(input: &str) -> Result<SnippetId, ErrorEnvelope> {
    SnippetId::parse(input).map_err(ErrorEnvelope::from)
}

fn format_snippet_text(snippet: &CodeSnippetDetail) -> String {
    format!(
        "status: ok\nid: {}\nrepository: {}\nfile: {}\n\n{}\n",
        snippet.id,
        snippet.repository_name.as_deref().unwrap_or("-"),
        snippet.file_path.as_deref().unwrap_or("-"),
        snippet.code.as_deref().unwrap_or_default(),
    )
}
