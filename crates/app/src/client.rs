//! Dependencies shared by the code-search use cases.

use codescope_ports::{CodeSearchApiPort, LogFields, LoggerPort};
use codescope_shared::{ErrorEnvelope, Result};
use serde_json::Value;
use std::sync::Arc;

/// Dependencies required by the code-search use cases.
#[derive(Clone)]
pub struct CodeSearchDeps {
    /// Remote API client.
    pub api: Arc<dyn CodeSearchApiPort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

impl CodeSearchDeps {
    /// Deps without a logger.
    #[must_use]
    pub fn new(api: Arc<dyn CodeSearchApiPort>) -> Self {
        Self { api, logger: None }
    }

    /// Attach a logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn LoggerPort>) -> Self {
        self.logger = Some(logger);
        self
    }
}

/// Emit `{operation}.completed`, `{operation}.aborted`, or `{operation}.failed`.
pub(crate) fn log_outcome<T>(
    logger: Option<&Arc<dyn LoggerPort>>,
    operation: &str,
    result: &Result<T>,
    fields: LogFields,
) {
    let Some(logger) = logger else {
        return;
    };
    match result {
        Ok(_) => logger.info(
            &format!("{operation}.completed"),
            &format!("{operation} completed"),
            Some(fields),
        ),
        Err(error) if error.is_cancelled() => logger.info(
            &format!("{operation}.aborted"),
            &format!("{operation} aborted"),
            Some(fields),
        ),
        Err(error) => logger.error(&format!("{operation}.failed"), error, Some(fields)),
    }
}

pub(crate) fn field(key: &str, value: impl Into<Value>) -> (Box<str>, Value) {
    (Box::from(key), value.into())
}

pub(crate) fn cancelled(operation: &'static str) -> ErrorEnvelope {
    ErrorEnvelope::cancelled("operation cancelled").with_metadata("operation", operation)
}
