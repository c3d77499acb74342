// Code-search HTTP adapter tests against a mock server.

use codescope_adapters::{HttpCodeSearchApi, HttpCodeSearchApiConfig};
use codescope_domain::{
    HistoryId, NewRepository, RepositoryId, RepositoryKind, SearchQuery, SearchRequest, SnippetId,
};
use codescope_ports::{CodeSearchApiPort, FileContentRequest};
use codescope_shared::{ErrorClass, ErrorCode, RequestContext, Result};
use serde_json::json;
use wiremock::matchers::{body_json, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> Result<HttpCodeSearchApi> {
    HttpCodeSearchApi::new(&HttpCodeSearchApiConfig {
        base_url: server.uri().into(),
        timeout_ms: 5_000,
    })
}

#[tokio::test]
async fn search_sends_trimmed_query_and_repo_scope() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("query", "parse config"))
        .and(query_param("repoId", "7"))
        .and(header_exists("x-request-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "id": 1, "file_path": "a.py", "code_preview": "print(1)", "similarity_score": 0.873 },
                { "id": "snip-2", "file_path": "b.rs" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server)?;
    let response = api
        .search(
            &RequestContext::new_request(),
            SearchRequest {
                query: SearchQuery::parse("  parse config ")?,
                repo_id: Some(RepositoryId::from(7)),
            },
        )
        .await?;

    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[0].similarity_score.present(), Some(&0.873));
    assert_eq!(response.results[1].id.to_string(), "snip-2");
    assert_eq!(response.results[1].code_preview, None);
    Ok(())
}

#[tokio::test]
async fn search_without_results_key_is_empty() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let api = client(&server)?;
    let response = api
        .search(
            &RequestContext::new_request(),
            SearchRequest {
                query: SearchQuery::parse("anything")?,
                repo_id: None,
            },
        )
        .await?;
    assert!(response.results.is_empty());
    Ok(())
}

#[tokio::test]
async fn create_repository_posts_name_path_type() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/repositories"))
        .and(body_json(json!({ "name": "api", "path": "/srv/api", "type": "upload" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 3, "name": "api", "fileCount": 0, "indexed": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server)?;
    let created = api
        .create_repository(
            &RequestContext::new_request(),
            NewRepository::new(" api ", "/srv/api", RepositoryKind::Upload)?,
        )
        .await?;
    assert_eq!(created.id, RepositoryId::from(3));
    assert_eq!(created.file_count, Some(0));
    Ok(())
}

#[tokio::test]
async fn file_content_is_raw_text_with_encoded_path() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/repositories/3/file"))
        .and(query_param("path", "src/main file.rs"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fn main() {}\n"))
        .mount(&server)
        .await;

    let api = client(&server)?;
    let text = api
        .get_file_content(
            &RequestContext::new_request(),
            FileContentRequest {
                repository_id: RepositoryId::from(3),
                path: "src/main file.rs".into(),
            },
        )
        .await?;
    assert_eq!(text, "fn main() {}\n");
    Ok(())
}

#[tokio::test]
async fn index_explain_and_deletes_hit_their_endpoints() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/repositories/3/index"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "status": "indexing" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/code/9/explain"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "explanation": "Prints one." })),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/repositories/3"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/history/11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let api = client(&server)?;
    let ctx = RequestContext::new_request();

    let accepted = api.start_indexing(&ctx, RepositoryId::from(3)).await?;
    assert_eq!(accepted.status.as_deref(), Some("indexing"));

    let explanation = api.explain_code(&ctx, SnippetId::from(9)).await?;
    assert_eq!(&*explanation.explanation, "Prints one.");

    let ack = api.delete_repository(&ctx, RepositoryId::from(3)).await?;
    assert_eq!(ack.success, None);

    let ack = api.delete_history(&ctx, HistoryId::from(11)).await?;
    assert_eq!(ack.success, Some(true));
    Ok(())
}

#[tokio::test]
async fn error_statuses_carry_code_status_and_endpoint() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/code/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Snippet not found" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let api = client(&server)?;
    let ctx = RequestContext::new_request();

    let error = api
        .get_code_snippet(&ctx, SnippetId::from(404))
        .await
        .err()
        .ok_or_else(|| codescope_shared::ErrorEnvelope::cancelled("expected an error"))?;
    assert_eq!(error.code, ErrorCode::not_found());
    assert_eq!(error.message, "Snippet not found");
    assert_eq!(error.metadata.get("status").map(String::as_str), Some("404"));
    assert_eq!(
        error.metadata.get("endpoint").map(String::as_str),
        Some("GET /api/code/{id}")
    );
    assert_eq!(error.metadata.get("snippet_id").map(String::as_str), Some("404"));

    let error = api
        .list_history(&ctx)
        .await
        .err()
        .ok_or_else(|| codescope_shared::ErrorEnvelope::cancelled("expected an error"))?;
    assert_eq!(error.code, ErrorCode::dependency_unavailable());
    assert_eq!(error.class, ErrorClass::Retriable);
    Ok(())
}

#[tokio::test]
async fn undecodable_body_is_invalid_response() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let api = client(&server)?;
    let error = api
        .list_repositories(&RequestContext::new_request())
        .await
        .err()
        .ok_or_else(|| codescope_shared::ErrorEnvelope::cancelled("expected an error"))?;
    assert_eq!(error.code, ErrorCode::new("api", "invalid_response"));
    Ok(())
}

#[tokio::test]
async fn cancelled_context_short_circuits() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let api = client(&server)?;
    let ctx = RequestContext::new_request();
    ctx.cancel();

    let error = api.list_history(&ctx).await.err();
    assert!(error.is_some_and(|error| error.is_cancelled()));
    Ok(())
}

#[tokio::test]
async fn connection_refused_maps_to_io() -> Result<()> {
    let api = HttpCodeSearchApi::new(&HttpCodeSearchApiConfig {
        base_url: "http://127.0.0.1:9".into(),
        timeout_ms: 2_000,
    })?;
    let error = api
        .list_repositories(&RequestContext::new_request())
        .await
        .err()
        .ok_or_else(|| codescope_shared::ErrorEnvelope::cancelled("expected an error"))?;
    assert_eq!(error.code, ErrorCode::io());
    assert!(error.class.is_retriable());
    Ok(())
}
