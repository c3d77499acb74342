//! # codescope-app
//!
//! Application use cases for the code-search client: Markdown export,
//! search, repositories, snippets, history, and sign-in.
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod auth;
pub mod client;
pub mod export;
pub mod history;
pub mod markdown;
pub mod repositories;
pub mod search;
pub mod snippets;

pub use auth::{AuthDeps, AuthInput, sign_in, sign_up};
pub use client::CodeSearchDeps;
pub use export::{
    DATA_MISMATCH_MESSAGE, EXPORT_EXTENSION, ExportData, ExportDeps, ExportKind, ExportOutcome,
    INVALID_TYPE_MESSAGE, NO_DATA_MESSAGE, download_file, export_markdown,
};
pub use history::{
    DELETE_HISTORY_FAILED_MESSAGE, LOAD_HISTORY_FAILED_MESSAGE, delete_history, list_history,
};
pub use markdown::{
    extract_fenced_code, format_code_detail_markdown, format_search_results_markdown,
};
pub use repositories::{
    AddRepositoryInput, FILE_CONTENT_ERROR_PLACEHOLDER, IndexRepositoryInput,
    IndexRepositoryOutput, add_repository, delete_repository, index_repository,
    list_repositories, load_file_content, load_repository,
};
pub use search::{
    EXPLAIN_FAILED_MESSAGE, RunSearchInput, SEARCH_FAILED_MESSAGE, explain_snippet, run_search,
};
pub use snippets::{LOAD_CODE_FAILED_MESSAGE, load_code_snippet};

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
