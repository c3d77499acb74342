//! Code snippet detail use case.

use crate::client::{CodeSearchDeps, field, log_outcome};
use codescope_domain::{CodeSnippetDetail, SnippetId};
use codescope_ports::LogFields;
use codescope_shared::{ErrorCode, RequestContext, Result, ResultExt};

/// Shown when a snippet cannot be loaded.
pub const LOAD_CODE_FAILED_MESSAGE: &str = "Failed to load code";

/// Load a snippet with its repository and file metadata.
#[tracing::instrument(name = "load_code_snippet", skip_all, fields(snippet_id = %id))]
pub async fn load_code_snippet(
    ctx: &RequestContext,
    deps: &CodeSearchDeps,
    id: SnippetId,
) -> Result<CodeSnippetDetail> {
    let fields = LogFields::from([field("snippetId", id.to_string())]);
    let result = deps
        .api
        .get_code_snippet(ctx, id)
        .await
        .user_facing(ErrorCode::new("snippet", "load_failed"), LOAD_CODE_FAILED_MESSAGE);
    log_outcome(deps.logger.as_ref(), "snippet.load", &result, fields);
    result
}
