//! # codescope-domain
//!
//! Records exchanged with the code-search service plus the pure rules the
//! client applies to them:
//!
//! - **Identifiers** - `RepositoryId`, `SnippetId`, `HistoryId`
//! - **Records** - `RepositorySummary`, `SearchResultItem`, `CodeSnippetDetail`, `HistoryRecord`
//! - **Search** - query validation and score display
//! - **Indexing** - the synthetic progress ticker
//! - **Auth** - credential checks and provider error mapping
//! - **Wire fields** - `WireValue`, keeping missing and `null` apart
//!
//! ## Dependency Rules
//!
//! - Depends only on the `shared` crate
//! - No I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use codescope_shared::shared_crate_version;

pub mod auth;
pub mod history;
pub mod ids;
pub mod indexing;
pub mod repository;
pub mod search;
pub mod snippet;
pub mod wire;

pub use auth::{
    AuthErrorCode, CREDENTIALS_REQUIRED_MESSAGE, Credentials, CredentialsError,
    GENERIC_AUTH_MESSAGE, IdentitySession,
};
pub use history::HistoryRecord;
pub use ids::{HistoryId, IdError, OpaqueId, RepositoryId, SnippetId};
pub use indexing::{DEFAULT_PROGRESS_STEP, IndexingProgress, ProgressTick};
pub use repository::{
    Acknowledgement, IndexingAccepted, NewRepository, RepositoryError, RepositoryKind,
    RepositorySummary,
};
pub use search::{
    MIN_QUERY_CHARS, QUERY_TOO_SHORT_MESSAGE, SearchQuery, SearchQueryError, SearchRequest,
    SearchResponse, SearchResultItem, format_score_display,
};
pub use snippet::{CodeExplanation, CodeSnippetDetail, copy_with_attribution};
pub use wire::{ABSENT_TEXT, NULL_TEXT, WireValue};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
