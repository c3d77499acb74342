//! Search history use cases.

use crate::client::{CodeSearchDeps, field, log_outcome};
use codescope_domain::{Acknowledgement, HistoryId, HistoryRecord};
use codescope_ports::LogFields;
use codescope_shared::{ErrorCode, RequestContext, Result, ResultExt};

/// Shown when history cannot be loaded.
pub const LOAD_HISTORY_FAILED_MESSAGE: &str = "Failed to load history";
/// Shown when a history entry cannot be deleted.
pub const DELETE_HISTORY_FAILED_MESSAGE: &str = "Failed to delete history entry";

/// List past searches, most recent first as returned by the service.
#[tracing::instrument(name = "list_history", skip_all)]
pub async fn list_history(
    ctx: &RequestContext,
    deps: &CodeSearchDeps,
) -> Result<Vec<HistoryRecord>> {
    let result = deps
        .api
        .list_history(ctx)
        .await
        .user_facing(ErrorCode::new("history", "load_failed"), LOAD_HISTORY_FAILED_MESSAGE);
    let mut fields = LogFields::new();
    if let Ok(records) = &result {
        fields.insert("count".into(), records.len().into());
    }
    log_outcome(deps.logger.as_ref(), "history.list", &result, fields);
    result
}

/// Remove one history entry.
#[tracing::instrument(name = "delete_history", skip_all, fields(history_id = %id))]
pub async fn delete_history(
    ctx: &RequestContext,
    deps: &CodeSearchDeps,
    id: HistoryId,
) -> Result<Acknowledgement> {
    let fields = LogFields::from([field("historyId", id.to_string())]);
    let result = deps
        .api
        .delete_history(ctx, id)
        .await
        .user_facing(
            ErrorCode::new("history", "delete_failed"),
            DELETE_HISTORY_FAILED_MESSAGE,
        );
    log_outcome(deps.logger.as_ref(), "history.delete", &result, fields);
    result
}
