//! Export use case: validate, render Markdown, deliver `{filename}.md`.

use crate::markdown::{format_code_detail_markdown, format_search_results_markdown};
use codescope_domain::{CodeSnippetDetail, SearchResultItem};
use codescope_ports::{
    DeliveryFilename, DeliveryReceipt, DeliveryRequest, FileDeliveryPort, LogFields, LoggerPort,
    MEDIA_TYPE_MARKDOWN,
};
use codescope_shared::{ErrorCode, ErrorEnvelope, Result};
use serde_json::Value;
use std::sync::Arc;

/// Extension appended to every export filename.
pub const EXPORT_EXTENSION: &str = "md";

/// Message when there is nothing to export.
pub const NO_DATA_MESSAGE: &str = "No data available to export";

/// Message for an unknown export kind.
pub const INVALID_TYPE_MESSAGE: &str = "Invalid export type";

/// Message when the data does not fit the requested kind.
pub const DATA_MISMATCH_MESSAGE: &str = "Export data does not match export type";

/// What is being exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// A list of search results (`search`).
    Search,
    /// A single code snippet (`code`).
    Code,
}

impl ExportKind {
    /// Parse `search` or `code`.
    pub fn parse(input: &str) -> Result<Self> {
        match input {
            "search" => Ok(Self::Search),
            "code" => Ok(Self::Code),
            other => Err(
                ErrorEnvelope::expected(ErrorCode::new("export", "invalid_type"), INVALID_TYPE_MESSAGE)
                    .with_metadata("kind", other),
            ),
        }
    }

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Code => "code",
        }
    }
}

/// Data handed to the export controller.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportData {
    /// Results of a search.
    SearchResults(Vec<SearchResultItem>),
    /// A loaded snippet.
    CodeSnippet(CodeSnippetDetail),
}

impl ExportData {
    const fn is_empty(&self) -> bool {
        match self {
            Self::SearchResults(results) => results.is_empty(),
            Self::CodeSnippet(_) => false,
        }
    }

    const fn kind(&self) -> ExportKind {
        match self {
            Self::SearchResults(_) => ExportKind::Search,
            Self::CodeSnippet(_) => ExportKind::Code,
        }
    }

    fn render(&self) -> String {
        match self {
            Self::SearchResults(results) => format_search_results_markdown(results),
            Self::CodeSnippet(snippet) => format_code_detail_markdown(snippet),
        }
    }
}

/// Dependencies required by export.
#[derive(Clone)]
pub struct ExportDeps {
    /// Where finished documents go.
    pub delivery: Arc<dyn FileDeliveryPort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    /// Exported kind.
    pub kind: ExportKind,
    /// Delivery receipt for the written document.
    pub receipt: DeliveryReceipt,
}

/// Validate `data` against `kind`, render it, and deliver `{filename}.md`.
///
/// Checks run in a fixed order: missing or empty data, then the kind, then
/// whether the data matches the kind. Nothing is rendered or delivered
/// unless all three pass.
pub fn export_markdown(
    deps: &ExportDeps,
    kind: &str,
    data: Option<&ExportData>,
    filename: &str,
) -> Result<ExportOutcome> {
    if let Some(logger) = deps.logger.as_ref() {
        logger.info(
            "export.start",
            "Export started",
            Some(log_fields(kind, filename)),
        );
    }

    let result = run_export(deps, kind, data, filename);

    if let Some(logger) = deps.logger.as_ref() {
        match &result {
            Ok(outcome) => {
                let mut fields = log_fields(kind, filename);
                fields.insert(
                    "location".into(),
                    Value::from(&*outcome.receipt.location),
                );
                fields.insert(
                    "bytesWritten".into(),
                    Value::from(outcome.receipt.bytes_written),
                );
                logger.info("export.completed", "Export completed", Some(fields));
            },
            Err(error) => logger.error("export.failed", error, Some(log_fields(kind, filename))),
        }
    }

    result
}

fn run_export(
    deps: &ExportDeps,
    kind: &str,
    data: Option<&ExportData>,
    filename: &str,
) -> Result<ExportOutcome> {
    let data = match data {
        Some(data) if !data.is_empty() => data,
        _ => {
            return Err(ErrorEnvelope::expected(
                ErrorCode::new("export", "no_data"),
                NO_DATA_MESSAGE,
            ));
        },
    };

    let kind = ExportKind::parse(kind)?;
    if data.kind() != kind {
        return Err(ErrorEnvelope::expected(
            ErrorCode::new("export", "data_mismatch"),
            DATA_MISMATCH_MESSAGE,
        )
        .with_metadata("kind", kind.as_str())
        .with_metadata("data_kind", data.kind().as_str()));
    }

    let target = format!("{filename}.{EXPORT_EXTENSION}");
    let receipt = download_file(deps.delivery.as_ref(), &data.render(), &target)?;
    Ok(ExportOutcome { kind, receipt })
}

/// Hand `content` to `delivery` as a Markdown file named `filename`.
pub fn download_file(
    delivery: &dyn FileDeliveryPort,
    content: &str,
    filename: &str,
) -> Result<DeliveryReceipt> {
    let filename = DeliveryFilename::parse(filename)?;
    delivery.deliver(DeliveryRequest {
        bytes: content.as_bytes().to_vec(),
        filename,
        media_type: Box::from(MEDIA_TYPE_MARKDOWN),
    })
}

fn log_fields(kind: &str, filename: &str) -> LogFields {
    LogFields::from([
        (Box::from("kind"), Value::from(kind)),
        (Box::from("filename"), Value::from(filename)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parse_accepts_only_search_and_code() {
        assert_eq!(ExportKind::parse("search").ok(), Some(ExportKind::Search));
        assert_eq!(ExportKind::parse("code").ok(), Some(ExportKind::Code));

        let error = ExportKind::parse("Search").err();
        assert_eq!(
            error.as_ref().map(|error| error.message.as_str()),
            Some(INVALID_TYPE_MESSAGE)
        );
        assert_eq!(
            error.and_then(|error| error.metadata.get("kind").cloned()),
            Some("Search".to_owned())
        );
    }

    #[test]
    fn empty_search_results_count_as_no_data() {
        assert!(ExportData::SearchResults(Vec::new()).is_empty());
    }
}
