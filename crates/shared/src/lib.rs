//! # codescope-shared
//!
//! Shared result types, error envelopes, request context, and redaction
//! helpers for the codescope workspace.
//!
//! This crate has no workspace dependencies; every other crate builds on it.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod bounded;
pub mod context;
pub mod errors;
pub mod redaction;
pub mod result;

pub use bounded::{BoundedU64, OutOfRange};
pub use context::{CorrelationId, RequestContext};
pub use tokio_util::sync::CancellationToken;
pub use errors::{
    CAUSE_CODE_KEY, CAUSE_MESSAGE_KEY, ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind,
    ErrorMetadata,
};
pub use redaction::{REDACTED, SecretString, is_secret_key};
pub use result::{Result, ResultExt};

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
