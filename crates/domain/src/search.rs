//! Search query validation and search result records.

use crate::{RepositoryId, SnippetId, WireValue};
use codescope_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum number of characters (after trimming) a query must have.
pub const MIN_QUERY_CHARS: usize = 3;

/// Message shown when a query is too short.
pub const QUERY_TOO_SHORT_MESSAGE: &str = "Please enter at least 3 characters to search.";

/// Validation failures for search input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQueryError {
    /// Query shorter than [`MIN_QUERY_CHARS`] after trimming.
    TooShort {
        /// Character count after trimming.
        chars: usize,
    },
}

impl fmt::Display for SearchQueryError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { .. } => formatter.write_str(QUERY_TOO_SHORT_MESSAGE),
        }
    }
}

impl std::error::Error for SearchQueryError {}

impl From<SearchQueryError> for ErrorEnvelope {
    fn from(error: SearchQueryError) -> Self {
        match error {
            SearchQueryError::TooShort { chars } => Self::expected(
                ErrorCode::new("search", "query_too_short"),
                error.to_string(),
            )
            .with_metadata("chars", chars.to_string()),
        }
    }
}

/// A trimmed natural-language query with at least three characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SearchQuery(Box<str>);

impl SearchQuery {
    /// Validate raw user input.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, SearchQueryError> {
        let trimmed = input.as_ref().trim();
        let chars = trimmed.chars().count();
        if chars < MIN_QUERY_CHARS {
            return Err(SearchQueryError::TooShort { chars });
        }
        Ok(Self(Box::from(trimmed)))
    }

    /// Access the query text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Parameters for `GET /api/search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Validated query.
    pub query: SearchQuery,
    /// Optional repository scope (`repoId`).
    pub repo_id: Option<RepositoryId>,
}

/// One snippet in a search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    /// Snippet identifier.
    pub id: SnippetId,
    /// Source file the snippet came from.
    #[serde(default, skip_serializing_if = "WireValue::is_absent")]
    pub file_path: WireValue<Box<str>>,
    /// Truncated code text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_preview: Option<Box<str>>,
    /// Similarity score; range is service-defined.
    #[serde(default, skip_serializing_if = "WireValue::is_absent")]
    pub similarity_score: WireValue<f64>,
}

/// Body of `GET /api/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matching snippets in ranking order.
    #[serde(default)]
    pub results: Vec<SearchResultItem>,
}

/// Score as shown on result cards: three decimals, or `N/A` when absent.
///
/// ```
/// use codescope_domain::format_score_display;
///
/// assert_eq!(format_score_display(Some(0.87345)), "0.873");
/// assert_eq!(format_score_display(None), "N/A");
/// ```
#[must_use]
pub fn format_score_display(score: Option<f64>) -> String {
    score.map_or_else(|| "N/A".to_owned(), fixed_three_places)
}

/// Three-decimal text where exact halves round away from zero.
///
/// `{:.3}` breaks exact ties to even (`0.0625` gives `0.062`); card scores
/// round them up instead (`0.063`). A value is an exact tie at three places
/// only when sixteen times it is an odd integer.
fn fixed_three_places(score: f64) -> String {
    if score.is_infinite() {
        return if score > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    let sixteenths = score.abs() * 16.0;
    let is_tie = sixteenths.fract() == 0.0 && (sixteenths / 2.0).fract() != 0.0;
    if !is_tie {
        return format!("{score:.3}");
    }
    let sign = if score < 0.0 { "-" } else { "" };
    let thousandths = (score.abs() * 1000.0).round();
    format!("{sign}{:.3}", thousandths / 1000.0)
}
