//! Per-command request context.
//!
//! A [`RequestContext`] is created once per CLI invocation and passed to every
//! port call. It carries the correlation id stamped on log events and the
//! token that Ctrl-C cancels. Adapters race their HTTP futures against
//! [`RequestContext::cancelled`].

use crate::{ErrorEnvelope, Result};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio_util::sync::CancellationToken;

static NEXT_REQUEST: AtomicU32 = AtomicU32::new(1);

/// Id tying together the log events of one command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(Arc<str>);

impl CorrelationId {
    /// `cs-<pid>-<n>`, unique per process run.
    #[must_use]
    pub fn generate() -> Self {
        let sequence = NEXT_REQUEST.fetch_add(1, Ordering::Relaxed);
        Self(format!("cs-{:x}-{sequence}", std::process::id()).into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Correlation id plus cancellation, cloned freely across tasks.
#[derive(Debug, Clone)]
pub struct RequestContext {
    correlation_id: CorrelationId,
    cancellation: CancellationToken,
}

impl RequestContext {
    /// Fresh context with a generated correlation id.
    #[must_use]
    pub fn new_request() -> Self {
        Self {
            correlation_id: CorrelationId::generate(),
            cancellation: CancellationToken::new(),
        }
    }

    #[must_use]
    pub const fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// Token shared with this context; cancelling it cancels the request.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Resolves once the request is cancelled.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await;
    }

    /// Fail with a cancellation error naming `operation` if already cancelled.
    pub fn ensure_not_cancelled(&self, operation: &'static str) -> Result<()> {
        if self.is_cancelled() {
            return Err(ErrorEnvelope::cancelled("operation cancelled")
                .with_metadata("operation", operation));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn generated_ids_differ() {
        let first = CorrelationId::generate();
        let second = CorrelationId::generate();
        assert_ne!(first, second);
        assert!(first.as_str().starts_with("cs-"));
    }

    #[test]
    fn cancelled_context_names_the_operation() {
        let ctx = RequestContext::new_request();
        assert!(ctx.ensure_not_cancelled("code_search.search").is_ok());

        ctx.cancellation_token().cancel();
        let error = ctx.ensure_not_cancelled("code_search.search").err();
        assert!(error.as_ref().is_some_and(ErrorEnvelope::is_cancelled));
        assert_eq!(
            error
                .as_ref()
                .and_then(|error| error.metadata.get("operation"))
                .map(String::as_str),
            Some("code_search.search")
        );
    }

    #[tokio::test]
    async fn clones_observe_cancellation() {
        let ctx = RequestContext::new_request();
        let waiter = ctx.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        ctx.cancel();

        let joined = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(matches!(joined, Ok(Ok(()))));
    }
}
