//! Semantic search and snippet explanation use cases.

use crate::client::{CodeSearchDeps, field, log_outcome};
use codescope_domain::{
    CodeExplanation, RepositoryId, SearchQuery, SearchRequest, SearchResponse, SnippetId,
};
use codescope_ports::LogFields;
use codescope_shared::{ErrorCode, RequestContext, Result, ResultExt};

/// Shown when the search request itself fails.
pub const SEARCH_FAILED_MESSAGE: &str = "Search failed. Please try again.";

/// Shown when an explanation cannot be generated.
pub const EXPLAIN_FAILED_MESSAGE: &str = "Failed to generate explanation";

/// Input payload for a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSearchInput {
    /// Raw query text as typed.
    pub query: Box<str>,
    /// Optional repository scope.
    pub repo_id: Option<RepositoryId>,
}

/// Validate the query and run a semantic search.
///
/// A query shorter than three characters after trimming fails before any
/// request is made.
#[tracing::instrument(name = "run_search", skip_all, fields(repo_id = ?input.repo_id))]
pub async fn run_search(
    ctx: &RequestContext,
    deps: &CodeSearchDeps,
    input: RunSearchInput,
) -> Result<SearchResponse> {
    let query = SearchQuery::parse(&input.query)?;
    ctx.ensure_not_cancelled("run_search")?;

    let mut fields = LogFields::from([field("queryChars", query.as_str().chars().count())]);
    if let Some(repo_id) = &input.repo_id {
        fields.insert("repoId".into(), repo_id.to_string().into());
    }

    let result = deps
        .api
        .search(
            ctx,
            SearchRequest {
                query,
                repo_id: input.repo_id,
            },
        )
        .await
        .user_facing(ErrorCode::new("search", "failed"), SEARCH_FAILED_MESSAGE);

    if let Ok(response) = &result {
        fields.insert("resultCount".into(), response.results.len().into());
    }
    log_outcome(deps.logger.as_ref(), "search", &result, fields);
    result
}

/// Ask the service to explain a snippet.
#[tracing::instrument(name = "explain_snippet", skip_all, fields(snippet_id = %id))]
pub async fn explain_snippet(
    ctx: &RequestContext,
    deps: &CodeSearchDeps,
    id: SnippetId,
) -> Result<CodeExplanation> {
    let fields = LogFields::from([field("snippetId", id.to_string())]);
    let result = deps
        .api
        .explain_code(ctx, id)
        .await
        .user_facing(ErrorCode::new("snippet", "explain_failed"), EXPLAIN_FAILED_MESSAGE);
    log_outcome(deps.logger.as_ref(), "explain", &result, fields);
    result
}
