//! Shared mapping from HTTP transport failures and statuses to envelopes.

use codescope_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use reqwest::StatusCode;
use serde::Deserialize;

/// Identifies the failing request in error metadata.
#[derive(Debug, Clone, Copy)]
pub struct HttpErrorContext {
    /// Remote service label (e.g. `code_search`).
    pub service: &'static str,
    /// Port operation (e.g. `code_search.search`).
    pub operation: &'static str,
    /// Templated endpoint (e.g. `GET /api/search`).
    pub endpoint: &'static str,
}

impl HttpErrorContext {
    fn annotate(self, envelope: ErrorEnvelope) -> ErrorEnvelope {
        envelope
            .with_metadata("service", self.service)
            .with_metadata("operation", self.operation)
            .with_metadata("endpoint", self.endpoint)
    }
}

/// Map a reqwest failure. The URL is stripped so query secrets never leak.
pub fn map_transport_error(error: reqwest::Error, ctx: HttpErrorContext) -> ErrorEnvelope {
    let error = error.without_url();
    let envelope = if error.is_timeout() {
        ErrorEnvelope::unexpected(
            ErrorCode::timeout(),
            format!("{} request timed out", ctx.service),
            ErrorClass::Retriable,
        )
    } else if error.is_connect() {
        ErrorEnvelope::unexpected(
            ErrorCode::io(),
            format!("{} connection failed: {error}", ctx.service),
            ErrorClass::Retriable,
        )
    } else {
        ErrorEnvelope::unexpected(
            ErrorCode::new("api", "request_failed"),
            format!("{} request failed: {error}", ctx.service),
            ErrorClass::NonRetriable,
        )
    };
    ctx.annotate(envelope)
}

/// Map a non-success status. A JSON `detail`/`message`/`error` field, when
/// present, becomes the envelope message.
pub fn map_status_error(
    status: StatusCode,
    payload: &[u8],
    ctx: HttpErrorContext,
) -> ErrorEnvelope {
    let message = error_detail(payload)
        .unwrap_or_else(|| format!("{} returned HTTP {}", ctx.service, status.as_u16()));

    let envelope = match status.as_u16() {
        400 | 422 => ErrorEnvelope::expected(ErrorCode::invalid_input(), message),
        404 => ErrorEnvelope::expected(ErrorCode::not_found(), message),
        401 | 403 => ErrorEnvelope::expected(ErrorCode::permission_denied(), message),
        408 => ErrorEnvelope::unexpected(ErrorCode::timeout(), message, ErrorClass::Retriable),
        429 => {
            ErrorEnvelope::unexpected(ErrorCode::rate_limited(), message, ErrorClass::Retriable)
        },
        _ if status.is_server_error() => ErrorEnvelope::unexpected(
            ErrorCode::dependency_unavailable(),
            message,
            ErrorClass::Retriable,
        ),
        _ => ErrorEnvelope::unexpected(
            ErrorCode::new("api", "http_error"),
            message,
            ErrorClass::NonRetriable,
        ),
    };

    ctx.annotate(envelope)
        .with_metadata("status", status.as_u16().to_string())
}

/// Body could not be decoded into the expected shape.
pub fn invalid_response(error: &serde_json::Error, ctx: HttpErrorContext) -> ErrorEnvelope {
    ctx.annotate(ErrorEnvelope::unexpected(
        ErrorCode::new("api", "invalid_response"),
        format!("invalid {} response: {error}", ctx.service),
        ErrorClass::NonRetriable,
    ))
}

/// Request abandoned because the context was cancelled.
pub fn cancelled_error(operation: &'static str) -> ErrorEnvelope {
    ErrorEnvelope::cancelled("operation cancelled").with_metadata("operation", operation)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Detail { detail: serde_json::Value },
    Message { message: String },
    Error { error: serde_json::Value },
}

fn error_detail(payload: &[u8]) -> Option<String> {
    let body: ErrorBody = serde_json::from_slice(payload).ok()?;
    let value = match body {
        ErrorBody::Message { message } => return non_empty(message),
        ErrorBody::Detail { detail: value } | ErrorBody::Error { error: value } => value,
    };
    match value {
        serde_json::Value::String(text) => non_empty(text),
        serde_json::Value::Object(map) => map
            .get("message")
            .and_then(serde_json::Value::as_str)
            .and_then(|text| non_empty(text.to_owned())),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
