//! Search history records.

use crate::HistoryId;
use serde::{Deserialize, Serialize};

/// One entry of `GET /api/history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// History entry identifier.
    pub id: HistoryId,
    /// Query text as it was searched.
    #[serde(default)]
    pub query: Box<str>,
    /// Number of results the search returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_count: Option<u64>,
    /// Timestamp as sent by the service (not parsed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searched_at: Option<Box<str>>,
}
