//! Search command handler.

use crate::error::CliError;
use crate::format::{
    CliOutput, OutputMode, format_ndjson_summary, json_document, log_info, ndjson_line,
};
use crate::runtime::ClientRuntime;
use codescope_app::{ExportData, RunSearchInput, export_markdown};
use codescope_domain::{RepositoryId, SearchResultItem, format_score_display};
use codescope_shared::ErrorEnvelope;
use serde_json::json;

/// Default export name for search results (`.md` is appended).
pub const DEFAULT_SEARCH_EXPORT_NAME: &str = "search-results";

/// Search command parameters.
#[derive(Debug)]
pub struct SearchCommandInput<'a> {
    pub query: &'a str,
    pub repo_id: Option<&'a str>,
    /// Export name; `Some("")` falls back to [`DEFAULT_SEARCH_EXPORT_NAME`].
    pub export: Option<&'a str>,
}

/// Run a search, optionally exporting the results as Markdown.
pub async fn run_search(
    mode: OutputMode,
    runtime: &ClientRuntime,
    input: SearchCommandInput<'_>,
) -> Result<CliOutput, CliError> {
    let repo_id = input
        .repo_id
        .map(RepositoryId::parse)
        .transpose()
        .map_err(ErrorEnvelope::from)?;
    let deps = runtime.code_search_deps()?;
    let response = codescope_app::run_search(
        &runtime.ctx,
        &deps,
        RunSearchInput {
            query: input.query.into(),
            repo_id,
        },
    )
    .await?;
    let results = response.results;

    let mut stderr = String::new();
    let export_location = match input.export {
        Some(name) => {
            let name = if name.trim().is_empty() {
                DEFAULT_SEARCH_EXPORT_NAME
            } else {
                name
            };
            let data = ExportData::SearchResults(results.clone());
            let outcome = export_markdown(&runtime.export_deps(), "search", Some(&data), name)?;
            log_info(
                &mut stderr,
                &format!("exported {}", outcome.receipt.location),
                mode.no_progress,
            );
            Some(outcome.receipt.location)
        },
        None => None,
    };

    let stdout = if mode.is_ndjson() {
        let mut out = String::new();
        for item in &results {
            out.push_str(&ndjson_line("result", item)?);
        }
        out.push_str(&format_ndjson_summary(
            "ok",
            "search",
            Some(json!({
                "count": results.len(),
                "exportLocation": export_location,
            })),
        ));
        out
    } else if mode.is_json() {
        json_document(&json!({
            "status": "ok",
            "results": results,
            "exportLocation": export_location,
        }))?
    } else {
        format_search_text(&results, export_location.as_deref())
    };

    Ok(CliOutput::ok(stdout, stderr))
}

fn format_search_text(results: &[SearchResultItem], export_location: Option<&str>) -> String {
    let mut out = format!("status: ok\nresults: {}\n", results.len());
    for (index, item) in results.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} (id {}, score {})\n",
            index + 1,
            item.file_path.as_deref().unwrap_or("-"),
            item.id,
            format_score_display(item.similarity_score.present().copied()),
        ));
        if let Some(preview) = item.code_preview.as_deref() {
            for line in preview.lines() {
                out.push_str("   ");
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    if let Some(location) = export_location {
        out.push_str("exported: ");
        out.push_str(location);
        out.push('\n');
    }
    out
}
