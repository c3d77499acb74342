//! Result alias and combinators for envelope-based error handling.

use crate::errors::{ErrorCode, ErrorEnvelope};

/// Shared result type used across the workspace.
pub type Result<T, E = ErrorEnvelope> = std::result::Result<T, E>;

/// Extension helpers for results carrying an [`ErrorEnvelope`].
pub trait ResultExt<T> {
    /// Replace the error with an expected error carrying a user-facing
    /// message, keeping the original failure as its cause.
    ///
    /// Cancellation passes through untouched.
    fn user_facing(self, code: ErrorCode, message: &str) -> Result<T>;

    /// Attach a metadata entry to the error, if any.
    fn with_error_metadata(self, key: &str, value: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn user_facing(self, code: ErrorCode, message: &str) -> Result<T> {
        self.map_err(|error| {
            if error.is_cancelled() {
                return error;
            }
            ErrorEnvelope::expected_with_class(code, message, error.class).with_cause(&error)
        })
    }

    fn with_error_metadata(self, key: &str, value: impl Into<String>) -> Result<T> {
        self.map_err(|error| error.with_metadata(key, value))
    }
}
