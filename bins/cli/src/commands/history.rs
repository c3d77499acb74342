//! Search history command handlers.

use crate::error::CliError;
use crate::format::{
    CliOutput, OutputMode, format_ndjson_summary, json_document, ndjson_line,
};
use crate::runtime::ClientRuntime;
use clap::Subcommand;
use codescope_app::{delete_history, list_history};
use codescope_domain::{Acknowledgement, HistoryId, HistoryRecord};
use codescope_shared::ErrorEnvelope;
use serde_json::json;

#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    /// List past searches.
    List,
    /// Delete one history entry.
    Delete {
        /// History entry id.
        id: String,
    },
}

/// Run a history subcommand.
pub async fn run_history(
    mode: OutputMode,
    runtime: &ClientRuntime,
    action: &HistoryAction,
) -> Result<CliOutput, CliError> {
    let deps = runtime.code_search_deps()?;
    let stdout = match action {
        HistoryAction::List => {
            let records = list_history(&runtime.ctx, &deps).await?;
            if mode.is_ndjson() {
                let mut out = String::new();
                for record in &records {
                    out.push_str(&ndjson_line("history", record)?);
                }
                out.push_str(&format_ndjson_summary(
                    "ok",
                    "history",
                    Some(json!({ "count": records.len() })),
                ));
                out
            } else if mode.is_json() {
                json_document(&json!({ "status": "ok", "history": records }))?
            } else {
                format_history_text(&records)
            }
        },
        HistoryAction::Delete { id } => {
            let id = HistoryId::parse(id).map_err(ErrorEnvelope::from)?;
            let ack = delete_history(&runtime.ctx, &deps, id).await?;
            format_acknowledgement(mode, "history", &ack)?
        },
    };
    Ok(CliOutput::ok(stdout, String::new()))
}

/// Render a mutation acknowledgement.
pub fn format_acknowledgement(
    mode: OutputMode,
    kind: &str,
    ack: &Acknowledgement,
) -> Result<String, CliError> {
    if mode.is_ndjson() {
        return Ok(format_ndjson_summary(
            "ok",
            kind,
            Some(json!({ "message": ack.message, "success": ack.success })),
        ));
    }
    if mode.is_json() {
        return json_document(&json!({
            "status": "ok",
            "message": ack.message,
            "success": ack.success,
        }));
    }
    Ok(ack.message.as_deref().map_or_else(
        || "status: ok\n".to_owned(),
        |message| format!("status: ok\nmessage: {message}\n"),
    ))
}

fn format_history_text(records: &[HistoryRecord]) -> String {
    let mut out = format!("status: ok\nentries: {}\n", records.len());
    for record in records {
        out.push_str(&format!(
            "{}  {}  results={}  at={}\n",
            record.id,
            record.query,
            record
                .result_count
                .map_or_else(|| "-".to_owned(), |count| count.to_string()),
            record.searched_at.as_deref().unwrap_or("-"),
        ));
    }
    out
}
