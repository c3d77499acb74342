//! Integration tests for the search, repository, history, and auth use cases.

use codescope_app::{
    AddRepositoryInput, AuthDeps, AuthInput, CodeSearchDeps, EXPLAIN_FAILED_MESSAGE,
    FILE_CONTENT_ERROR_PLACEHOLDER, IndexRepositoryInput, LOAD_HISTORY_FAILED_MESSAGE,
    RunSearchInput, SEARCH_FAILED_MESSAGE, add_repository, explain_snippet, index_repository,
    list_history, load_file_content, run_search, sign_in, sign_up,
};
use codescope_domain::{
    Acknowledgement, AuthErrorCode, CREDENTIALS_REQUIRED_MESSAGE, CodeExplanation,
    CodeSnippetDetail, Credentials, GENERIC_AUTH_MESSAGE, HistoryId, HistoryRecord,
    IdentitySession, IndexingAccepted, NewRepository, QUERY_TOO_SHORT_MESSAGE, RepositoryId,
    RepositorySummary, SearchRequest, SearchResponse, SearchResultItem, SnippetId, WireValue,
};
use codescope_ports::{BoxFuture, CodeSearchApiPort, FileContentRequest, IdentityPort};
use codescope_shared::{
    ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, RequestContext, Result, SecretString,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted API double that records which endpoints were called.
#[derive(Default)]
struct FakeApi {
    calls: Mutex<Vec<String>>,
    fail_with: Option<ErrorEnvelope>,
}

impl FakeApi {
    fn failing(error: ErrorEnvelope) -> Self {
        Self {
            calls: Mutex::default(),
            fail_with: Some(error),
        }
    }

    fn record(&self, call: impl Into<String>) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.into());
        }
        self.fail_with.clone().map_or(Ok(()), Err)
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

fn repository(id: i64, indexed: bool) -> RepositorySummary {
    RepositorySummary {
        id: RepositoryId::from(id),
        name: "demo".into(),
        file_count: Some(3),
        indexed,
        status: None,
        path: Some("/srv/demo".into()),
        file_list: None,
        description: None,
    }
}

impl CodeSearchApiPort for FakeApi {
    fn list_repositories(
        &self,
        _ctx: &RequestContext,
    ) -> BoxFuture<'_, Result<Vec<RepositorySummary>>> {
        Box::pin(async move {
            self.record("list_repositories")?;
            Ok(vec![repository(1, false)])
        })
    }

    fn create_repository(
        &self,
        _ctx: &RequestContext,
        request: NewRepository,
    ) -> BoxFuture<'_, Result<RepositorySummary>> {
        Box::pin(async move {
            self.record(format!("create_repository:{}:{}", request.name(), request.kind().as_str()))?;
            Ok(repository(2, false))
        })
    }

    fn get_repository(
        &self,
        _ctx: &RequestContext,
        id: RepositoryId,
    ) -> BoxFuture<'_, Result<RepositorySummary>> {
        Box::pin(async move {
            self.record(format!("get_repository:{id}"))?;
            Ok(repository(7, true))
        })
    }

    fn start_indexing(
        &self,
        _ctx: &RequestContext,
        id: RepositoryId,
    ) -> BoxFuture<'_, Result<IndexingAccepted>> {
        Box::pin(async move {
            self.record(format!("start_indexing:{id}"))?;
            Ok(IndexingAccepted {
                status: Some("indexing".into()),
                message: None,
            })
        })
    }

    fn delete_repository(
        &self,
        _ctx: &RequestContext,
        id: RepositoryId,
    ) -> BoxFuture<'_, Result<Acknowledgement>> {
        Box::pin(async move {
            self.record(format!("delete_repository:{id}"))?;
            Ok(Acknowledgement::default())
        })
    }

    fn get_file_content(
        &self,
        _ctx: &RequestContext,
        request: FileContentRequest,
    ) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            self.record(format!("get_file_content:{}", request.path))?;
            Ok("fn main() {}\n".to_owned())
        })
    }

    fn search(
        &self,
        _ctx: &RequestContext,
        request: SearchRequest,
    ) -> BoxFuture<'_, Result<SearchResponse>> {
        Box::pin(async move {
            self.record(format!("search:{}", request.query))?;
            Ok(SearchResponse {
                results: vec![SearchResultItem {
                    id: SnippetId::from(1),
                    file_path: "a.py".into(),
                    code_preview: Some("print(1)".into()),
                    similarity_score: WireValue::Present(0.873),
                }],
            })
        })
    }

    fn get_code_snippet(
        &self,
        _ctx: &RequestContext,
        id: SnippetId,
    ) -> BoxFuture<'_, Result<CodeSnippetDetail>> {
        Box::pin(async move {
            self.record(format!("get_code_snippet:{id}"))?;
            Ok(CodeSnippetDetail {
                id,
                repository_name: WireValue::Absent,
                file_path: "a.py".into(),
                code: "print(1)".into(),
            })
        })
    }

    fn explain_code(
        &self,
        _ctx: &RequestContext,
        id: SnippetId,
    ) -> BoxFuture<'_, Result<CodeExplanation>> {
        Box::pin(async move {
            self.record(format!("explain_code:{id}"))?;
            Ok(CodeExplanation {
                explanation: "Prints one.".into(),
            })
        })
    }

    fn list_history(&self, _ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<HistoryRecord>>> {
        Box::pin(async move {
            self.record("list_history")?;
            Ok(Vec::new())
        })
    }

    fn delete_history(
        &self,
        _ctx: &RequestContext,
        id: HistoryId,
    ) -> BoxFuture<'_, Result<Acknowledgement>> {
        Box::pin(async move {
            self.record(format!("delete_history:{id}"))?;
            Ok(Acknowledgement::default())
        })
    }
}

/// Identity double returning a fixed outcome.
struct FakeIdentity {
    calls: Mutex<usize>,
    outcome: Result<IdentitySession>,
}

impl FakeIdentity {
    fn new(outcome: Result<IdentitySession>) -> Self {
        Self {
            calls: Mutex::new(0),
            outcome,
        }
    }

    fn respond(&self) -> Result<IdentitySession> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }
        self.outcome.clone()
    }

    fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| *calls).unwrap_or_default()
    }
}

impl IdentityPort for FakeIdentity {
    fn sign_in(
        &self,
        _ctx: &RequestContext,
        _credentials: Credentials,
    ) -> BoxFuture<'_, Result<IdentitySession>> {
        Box::pin(async move { self.respond() })
    }

    fn sign_up(
        &self,
        _ctx: &RequestContext,
        _credentials: Credentials,
    ) -> BoxFuture<'_, Result<IdentitySession>> {
        Box::pin(async move { self.respond() })
    }
}

fn session() -> IdentitySession {
    IdentitySession {
        uid: "uid-1".into(),
        email: "dev@example.com".into(),
        id_token: SecretString::from("token"),
    }
}

fn expect_error<T: std::fmt::Debug>(result: Result<T>) -> Result<ErrorEnvelope> {
    match result {
        Ok(value) => Err(ErrorEnvelope::cancelled(format!("expected an error, got {value:?}"))),
        Err(error) => Ok(error),
    }
}

fn unavailable() -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::dependency_unavailable(),
        "code-search returned HTTP 503",
        ErrorClass::Retriable,
    )
}

#[tokio::test]
async fn short_query_never_reaches_the_api() -> Result<()> {
    let api = Arc::new(FakeApi::default());
    let deps = CodeSearchDeps::new(api.clone());

    let error = expect_error(
        run_search(
            &RequestContext::new_request(),
            &deps,
            RunSearchInput {
                query: "  ab  ".into(),
                repo_id: None,
            },
        )
        .await,
    )?;

    assert_eq!(error.message, QUERY_TOO_SHORT_MESSAGE);
    assert!(api.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn search_sends_trimmed_query() -> Result<()> {
    let api = Arc::new(FakeApi::default());
    let deps = CodeSearchDeps::new(api.clone());

    let response = run_search(
        &RequestContext::new_request(),
        &deps,
        RunSearchInput {
            query: "  parse config ".into(),
            repo_id: Some(RepositoryId::from(7)),
        },
    )
    .await?;

    assert_eq!(response.results.len(), 1);
    assert_eq!(api.calls(), vec!["search:parse config"]);
    Ok(())
}

#[tokio::test]
async fn search_failure_is_user_facing_with_cause() -> Result<()> {
    let deps = CodeSearchDeps::new(Arc::new(FakeApi::failing(unavailable())));

    let error = expect_error(
        run_search(
            &RequestContext::new_request(),
            &deps,
            RunSearchInput {
                query: "anything".into(),
                repo_id: None,
            },
        )
        .await,
    )?;

    assert_eq!(error.kind, ErrorKind::Expected);
    assert_eq!(error.message, SEARCH_FAILED_MESSAGE);
    assert_eq!(error.cause_code(), Some("core:dependency_unavailable"));
    assert!(error.class.is_retriable());
    Ok(())
}

#[tokio::test]
async fn explain_and_history_failures_use_fixed_messages() -> Result<()> {
    let deps = CodeSearchDeps::new(Arc::new(FakeApi::failing(unavailable())));
    let ctx = RequestContext::new_request();

    let error = expect_error(explain_snippet(&ctx, &deps, SnippetId::from(3)).await)?;
    assert_eq!(error.message, EXPLAIN_FAILED_MESSAGE);

    let error = expect_error(list_history(&ctx, &deps).await)?;
    assert_eq!(error.message, LOAD_HISTORY_FAILED_MESSAGE);
    Ok(())
}

#[tokio::test]
async fn add_repository_validates_before_calling() -> Result<()> {
    let api = Arc::new(FakeApi::default());
    let deps = CodeSearchDeps::new(api.clone());
    let ctx = RequestContext::new_request();

    let error = expect_error(
        add_repository(
            &ctx,
            &deps,
            AddRepositoryInput {
                name: "demo".into(),
                path: "/srv/demo".into(),
                kind: "clone".into(),
            },
        )
        .await,
    )?;
    assert_eq!(error.code, ErrorCode::new("domain", "invalid_repository_type"));

    let error = expect_error(
        add_repository(
            &ctx,
            &deps,
            AddRepositoryInput {
                name: "  ".into(),
                path: "/srv/demo".into(),
                kind: "connect".into(),
            },
        )
        .await,
    )?;
    assert_eq!(error.metadata.get("field").map(String::as_str), Some("name"));
    assert!(api.calls().is_empty());

    let created = add_repository(
        &ctx,
        &deps,
        AddRepositoryInput {
            name: " demo ".into(),
            path: "/srv/demo".into(),
            kind: "upload".into(),
        },
    )
    .await?;
    assert_eq!(created.id, RepositoryId::from(2));
    assert_eq!(api.calls(), vec!["create_repository:demo:upload"]);
    Ok(())
}

#[tokio::test]
async fn indexing_reports_synthetic_progress_then_refetches() -> Result<()> {
    let api = Arc::new(FakeApi::default());
    let deps = CodeSearchDeps::new(api.clone());
    let mut seen = Vec::new();

    let output = index_repository(
        &RequestContext::new_request(),
        &deps,
        IndexRepositoryInput {
            repository_id: RepositoryId::from(7),
            tick_interval: Duration::from_millis(1),
            step: 10,
        },
        |percent| seen.push(percent),
    )
    .await?;

    assert_eq!(seen, vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
    assert_eq!(output.accepted.status.as_deref(), Some("indexing"));
    assert!(output.repository.indexed);
    assert_eq!(api.calls(), vec!["start_indexing:7", "get_repository:7"]);
    Ok(())
}

#[tokio::test]
async fn cancelled_indexing_stops_before_refetch() -> Result<()> {
    let api = Arc::new(FakeApi::default());
    let deps = CodeSearchDeps::new(api.clone());
    let ctx = RequestContext::new_request();
    let canceller = ctx.clone();

    let error = expect_error(
        index_repository(
            &ctx,
            &deps,
            IndexRepositoryInput {
                repository_id: RepositoryId::from(7),
                tick_interval: Duration::from_millis(1),
                step: 25,
            },
            move |percent| {
                if percent >= 50 {
                    canceller.cancel();
                }
            },
        )
        .await,
    )?;

    assert!(error.is_cancelled());
    assert_eq!(api.calls(), vec!["start_indexing:7"]);
    Ok(())
}

#[tokio::test]
async fn file_content_failure_becomes_placeholder() -> Result<()> {
    let deps = CodeSearchDeps::new(Arc::new(FakeApi::failing(unavailable())));

    let text = load_file_content(
        &RequestContext::new_request(),
        &deps,
        FileContentRequest {
            repository_id: RepositoryId::from(1),
            path: "src/lib.rs".into(),
        },
    )
    .await?;

    assert_eq!(text, FILE_CONTENT_ERROR_PLACEHOLDER);
    Ok(())
}

#[tokio::test]
async fn cancellation_passes_through_user_facing_mapping() -> Result<()> {
    let deps = CodeSearchDeps::new(Arc::new(FakeApi::failing(ErrorEnvelope::cancelled(
        "request cancelled",
    ))));

    let error = expect_error(
        load_file_content(
            &RequestContext::new_request(),
            &deps,
            FileContentRequest {
                repository_id: RepositoryId::from(1),
                path: "src/lib.rs".into(),
            },
        )
        .await,
    )?;
    assert!(error.is_cancelled());
    Ok(())
}

#[tokio::test]
async fn empty_credentials_skip_the_provider() -> Result<()> {
    let identity = Arc::new(FakeIdentity::new(Ok(session())));
    let deps = AuthDeps {
        identity: identity.clone(),
        logger: None,
    };

    let error = expect_error(
        sign_in(
            &RequestContext::new_request(),
            &deps,
            AuthInput {
                email: "dev@example.com".into(),
                password: SecretString::from(""),
            },
        )
        .await,
    )?;

    assert_eq!(error.message, CREDENTIALS_REQUIRED_MESSAGE);
    assert_eq!(identity.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn provider_rejections_keep_their_message() -> Result<()> {
    let rejection = AuthErrorCode::from_provider_code("EMAIL_EXISTS").into_envelope();
    let deps = AuthDeps {
        identity: Arc::new(FakeIdentity::new(Err(rejection))),
        logger: None,
    };

    let error = expect_error(
        sign_up(
            &RequestContext::new_request(),
            &deps,
            AuthInput {
                email: "dev@example.com".into(),
                password: SecretString::from("hunter22"),
            },
        )
        .await,
    )?;
    assert_eq!(error.message, "An account with this email already exists");
    Ok(())
}

#[tokio::test]
async fn transport_failures_during_sign_in_use_generic_message() -> Result<()> {
    let deps = AuthDeps {
        identity: Arc::new(FakeIdentity::new(Err(ErrorEnvelope::unexpected(
            ErrorCode::io(),
            "connection refused",
            ErrorClass::Retriable,
        )))),
        logger: None,
    };

    let error = expect_error(
        sign_in(
            &RequestContext::new_request(),
            &deps,
            AuthInput {
                email: "dev@example.com".into(),
                password: SecretString::from("hunter22"),
            },
        )
        .await,
    )?;
    assert_eq!(error.message, GENERIC_AUTH_MESSAGE);
    assert_eq!(error.cause_code(), Some("core:io"));

    let session = sign_in(
        &RequestContext::new_request(),
        &AuthDeps {
            identity: Arc::new(FakeIdentity::new(Ok(session()))),
            logger: None,
        },
        AuthInput {
            email: "dev@example.com".into(),
            password: SecretString::from("hunter22"),
        },
    )
    .await?;
    assert_eq!(&*session.uid, "uid-1");
    Ok(())
}
