//! reqwest-backed client for the code-search HTTP API.

use crate::http_error::{
    HttpErrorContext, cancelled_error, invalid_response, map_status_error, map_transport_error,
};
use codescope_config::ValidatedClientConfig;
use codescope_domain::{
    Acknowledgement, CodeExplanation, CodeSnippetDetail, HistoryId, HistoryRecord,
    IndexingAccepted, NewRepository, RepositoryId, RepositorySummary, SearchRequest,
    SearchResponse, SnippetId,
};
use codescope_ports::{BoxFuture, CodeSearchApiPort, FileContentRequest};
use codescope_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

const SERVICE: &str = "code_search";
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Connection settings for [`HttpCodeSearchApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCodeSearchApiConfig {
    /// Service base URL; `/api/...` paths are appended.
    pub base_url: Box<str>,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl HttpCodeSearchApiConfig {
    /// Build from the validated client config.
    #[must_use]
    pub fn from_client_config(config: &ValidatedClientConfig) -> Self {
        Self {
            base_url: config.api.base_url.clone().into_boxed_str(),
            timeout_ms: config.limits().api_timeout_ms.get(),
        }
    }
}

/// HTTP implementation of [`CodeSearchApiPort`].
#[derive(Clone)]
pub struct HttpCodeSearchApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpCodeSearchApi {
    /// Create a client. Fails when the base URL cannot carry path segments.
    pub fn new(config: &HttpCodeSearchApiConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim()).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                format!("invalid code-search base url: {error}"),
            )
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "code-search base url cannot carry a path",
            ));
        }
        if config.timeout_ms == 0 {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "timeout must be greater than zero",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("api", "client_init_failed"),
                    format!("failed to build code-search client: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;

        Ok(Self { client, base_url })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ErrorEnvelope::invariant(
                    ErrorCode::internal(),
                    "code-search base url cannot carry a path",
                )
            })?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        ctx: &RequestContext,
        request: reqwest::RequestBuilder,
        error_ctx: HttpErrorContext,
    ) -> Result<Vec<u8>> {
        ctx.ensure_not_cancelled(error_ctx.operation)?;
        let request = request.header(REQUEST_ID_HEADER, ctx.correlation_id().as_str());

        let response = tokio::select! {
            () = ctx.cancelled() => return Err(cancelled_error(error_ctx.operation)),
            result = request.send() => {
                result.map_err(|error| map_transport_error(error, error_ctx))?
            }
        };

        let status = response.status();
        let payload = tokio::select! {
            () = ctx.cancelled() => return Err(cancelled_error(error_ctx.operation)),
            result = response.bytes() => {
                result.map_err(|error| map_transport_error(error, error_ctx))?
            }
        };

        if !status.is_success() {
            tracing::debug!(
                operation = error_ctx.operation,
                status = status.as_u16(),
                "code-search request failed"
            );
            return Err(map_status_error(status, &payload, error_ctx));
        }
        Ok(payload.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        url: Url,
        error_ctx: HttpErrorContext,
    ) -> Result<T> {
        let payload = self
            .send(ctx, self.client.request(Method::GET, url), error_ctx)
            .await?;
        decode(&payload, error_ctx)
    }
}

fn decode<T: DeserializeOwned>(payload: &[u8], error_ctx: HttpErrorContext) -> Result<T> {
    serde_json::from_slice(payload).map_err(|error| invalid_response(&error, error_ctx))
}

/// Empty bodies decode to `T::default()`.
fn decode_or_default<T: DeserializeOwned + Default>(
    payload: &[u8],
    error_ctx: HttpErrorContext,
) -> Result<T> {
    if payload.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    decode(payload, error_ctx)
}

const fn error_ctx(operation: &'static str, endpoint: &'static str) -> HttpErrorContext {
    HttpErrorContext {
        service: SERVICE,
        operation,
        endpoint,
    }
}

impl CodeSearchApiPort for HttpCodeSearchApi {
    fn list_repositories(
        &self,
        ctx: &RequestContext,
    ) -> BoxFuture<'_, Result<Vec<RepositorySummary>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let error_ctx = error_ctx("code_search.list_repositories", "GET /api/repositories");
            let url = self.url(&["repositories"])?;
            self.get_json(&ctx, url, error_ctx).await
        })
    }

    fn create_repository(
        &self,
        ctx: &RequestContext,
        request: NewRepository,
    ) -> BoxFuture<'_, Result<RepositorySummary>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let error_ctx = error_ctx("code_search.create_repository", "POST /api/repositories");
            let url = self.url(&["repositories"])?;
            let payload = self
                .send(&ctx, self.client.post(url).json(&request), error_ctx)
                .await?;
            decode(&payload, error_ctx)
        })
    }

    fn get_repository(
        &self,
        ctx: &RequestContext,
        id: RepositoryId,
    ) -> BoxFuture<'_, Result<RepositorySummary>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let error_ctx = error_ctx("code_search.get_repository", "GET /api/repositories/{id}");
            let id = id.to_string();
            let url = self.url(&["repositories", id.as_str()])?;
            self.get_json(&ctx, url, error_ctx)
                .await
                .map_err(|error| error.with_metadata("repository_id", id))
        })
    }

    fn start_indexing(
        &self,
        ctx: &RequestContext,
        id: RepositoryId,
    ) -> BoxFuture<'_, Result<IndexingAccepted>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let error_ctx = error_ctx(
                "code_search.start_indexing",
                "POST /api/repositories/{id}/index",
            );
            let id = id.to_string();
            let url = self.url(&["repositories", id.as_str(), "index"])?;
            let payload = self
                .send(&ctx, self.client.post(url), error_ctx)
                .await
                .map_err(|error| error.with_metadata("repository_id", id))?;
            // The body is opaque; anything that is not an object is ignored.
            Ok(serde_json::from_slice(&payload).unwrap_or_default())
        })
    }

    fn delete_repository(
        &self,
        ctx: &RequestContext,
        id: RepositoryId,
    ) -> BoxFuture<'_, Result<Acknowledgement>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let error_ctx = error_ctx(
                "code_search.delete_repository",
                "DELETE /api/repositories/{id}",
            );
            let id = id.to_string();
            let url = self.url(&["repositories", id.as_str()])?;
            let payload = self
                .send(&ctx, self.client.delete(url), error_ctx)
                .await
                .map_err(|error| error.with_metadata("repository_id", id))?;
            decode_or_default(&payload, error_ctx)
        })
    }

    fn get_file_content(
        &self,
        ctx: &RequestContext,
        request: FileContentRequest,
    ) -> BoxFuture<'_, Result<String>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let error_ctx = error_ctx(
                "code_search.get_file_content",
                "GET /api/repositories/{id}/file",
            );
            let id = request.repository_id.to_string();
            let mut url = self.url(&["repositories", id.as_str(), "file"])?;
            url.query_pairs_mut().append_pair("path", &request.path);
            let payload = self
                .send(&ctx, self.client.get(url), error_ctx)
                .await
                .map_err(|error| error.with_metadata("repository_id", id))?;
            Ok(String::from_utf8_lossy(&payload).into_owned())
        })
    }

    fn search(
        &self,
        ctx: &RequestContext,
        request: SearchRequest,
    ) -> BoxFuture<'_, Result<SearchResponse>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let error_ctx = error_ctx("code_search.search", "GET /api/search");
            let mut url = self.url(&["search"])?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("query", request.query.as_str());
                if let Some(repo_id) = &request.repo_id {
                    query.append_pair("repoId", &repo_id.to_string());
                }
            }
            self.get_json(&ctx, url, error_ctx).await
        })
    }

    fn get_code_snippet(
        &self,
        ctx: &RequestContext,
        id: SnippetId,
    ) -> BoxFuture<'_, Result<CodeSnippetDetail>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let error_ctx = error_ctx("code_search.get_code_snippet", "GET /api/code/{id}");
            let id = id.to_string();
            let url = self.url(&["code", id.as_str()])?;
            self.get_json(&ctx, url, error_ctx)
                .await
                .map_err(|error| error.with_metadata("snippet_id", id))
        })
    }

    fn explain_code(
        &self,
        ctx: &RequestContext,
        id: SnippetId,
    ) -> BoxFuture<'_, Result<CodeExplanation>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let error_ctx = error_ctx("code_search.explain_code", "POST /api/code/{id}/explain");
            let id = id.to_string();
            let url = self.url(&["code", id.as_str(), "explain"])?;
            let payload = self
                .send(&ctx, self.client.post(url), error_ctx)
                .await
                .map_err(|error| error.with_metadata("snippet_id", id))?;
            decode(&payload, error_ctx)
        })
    }

    fn list_history(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<HistoryRecord>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let error_ctx = error_ctx("code_search.list_history", "GET /api/history");
            let url = self.url(&["history"])?;
            self.get_json(&ctx, url, error_ctx).await
        })
    }

    fn delete_history(
        &self,
        ctx: &RequestContext,
        id: HistoryId,
    ) -> BoxFuture<'_, Result<Acknowledgement>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let error_ctx = error_ctx("code_search.delete_history", "DELETE /api/history/{id}");
            let id = id.to_string();
            let url = self.url(&["history", id.as_str()])?;
            let payload = self
                .send(&ctx, self.client.delete(url), error_ctx)
                .await
                .map_err(|error| error.with_metadata("history_id", id))?;
            decode_or_default(&payload, error_ctx)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base_url: &str) -> Result<HttpCodeSearchApi> {
        HttpCodeSearchApi::new(&HttpCodeSearchApiConfig {
            base_url: base_url.into(),
            timeout_ms: 1_000,
        })
    }

    #[test]
    fn url_appends_and_encodes_segments() -> Result<()> {
        let api = api("http://127.0.0.1:8000")?;
        let url = api.url(&["repositories", "my repo/1", "index"])?;
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8000/api/repositories/my%20repo%2F1/index"
        );
        Ok(())
    }

    #[test]
    fn url_keeps_base_path_prefix() -> Result<()> {
        let api = api("https://search.example.com/v2/")?;
        let url = api.url(&["history"])?;
        assert_eq!(url.as_str(), "https://search.example.com/v2/api/history");
        Ok(())
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(api("not a url").is_err());
        assert!(api("mailto:dev@example.com").is_err());
    }

    #[test]
    fn empty_acknowledgement_body_is_default() -> Result<()> {
        let ctx = error_ctx("code_search.delete_history", "DELETE /api/history/{id}");
        let ack: Acknowledgement = decode_or_default(b"", ctx)?;
        assert_eq!(ack, Acknowledgement::default());

        let error = decode_or_default::<Acknowledgement>(b"not json", ctx).err();
        assert_eq!(
            error.map(|error| error.code),
            Some(ErrorCode::new("api", "invalid_response"))
        );
        Ok(())
    }
}
