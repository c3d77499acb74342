//! Code-search service boundary contract.
//!
//! One method per remote endpoint. Implementations map transport failures
//! and non-success statuses to [`codescope_shared::ErrorEnvelope`] and never
//! retry.

use crate::BoxFuture;
use codescope_domain::{
    Acknowledgement, CodeExplanation, CodeSnippetDetail, HistoryId, HistoryRecord,
    IndexingAccepted, NewRepository, RepositoryId, RepositorySummary, SearchRequest,
    SearchResponse, SnippetId,
};
use codescope_shared::{RequestContext, Result};

/// Request for `GET /api/repositories/{id}/file?path=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContentRequest {
    /// Repository containing the file.
    pub repository_id: RepositoryId,
    /// Path as listed by the repository detail.
    pub path: Box<str>,
}

/// Typed client for the code-search HTTP API.
pub trait CodeSearchApiPort: Send + Sync {
    /// `GET /api/repositories`
    fn list_repositories(&self, ctx: &RequestContext)
    -> BoxFuture<'_, Result<Vec<RepositorySummary>>>;

    /// `POST /api/repositories`
    fn create_repository(
        &self,
        ctx: &RequestContext,
        request: NewRepository,
    ) -> BoxFuture<'_, Result<RepositorySummary>>;

    /// `GET /api/repositories/{id}`
    fn get_repository(
        &self,
        ctx: &RequestContext,
        id: RepositoryId,
    ) -> BoxFuture<'_, Result<RepositorySummary>>;

    /// `POST /api/repositories/{id}/index`
    fn start_indexing(
        &self,
        ctx: &RequestContext,
        id: RepositoryId,
    ) -> BoxFuture<'_, Result<IndexingAccepted>>;

    /// `DELETE /api/repositories/{id}`
    fn delete_repository(
        &self,
        ctx: &RequestContext,
        id: RepositoryId,
    ) -> BoxFuture<'_, Result<Acknowledgement>>;

    /// `GET /api/repositories/{id}/file?path=` (raw text body)
    fn get_file_content(
        &self,
        ctx: &RequestContext,
        request: FileContentRequest,
    ) -> BoxFuture<'_, Result<String>>;

    /// `GET /api/search?query=&repoId=`
    fn search(
        &self,
        ctx: &RequestContext,
        request: SearchRequest,
    ) -> BoxFuture<'_, Result<SearchResponse>>;

    /// `GET /api/code/{id}`
    fn get_code_snippet(
        &self,
        ctx: &RequestContext,
        id: SnippetId,
    ) -> BoxFuture<'_, Result<CodeSnippetDetail>>;

    /// `POST /api/code/{id}/explain`
    fn explain_code(
        &self,
        ctx: &RequestContext,
        id: SnippetId,
    ) -> BoxFuture<'_, Result<CodeExplanation>>;

    /// `GET /api/history`
    fn list_history(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<HistoryRecord>>>;

    /// `DELETE /api/history/{id}`
    fn delete_history(
        &self,
        ctx: &RequestContext,
        id: HistoryId,
    ) -> BoxFuture<'_, Result<Acknowledgement>>;
}
