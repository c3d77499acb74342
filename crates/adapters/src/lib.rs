//! # codescope-adapters
//!
//! Implementations of the `ports` contracts:
//!
//! - [`code_search::HttpCodeSearchApi`] talks to the code-search HTTP API
//! - [`identity::FirebaseIdentity`] signs users in against Identity Toolkit
//! - [`delivery::LocalFileDelivery`] writes exported documents to disk
//! - [`logger::JsonLogger`] emits structured log lines to a [`log_sink::LogSink`]

/// Code-search HTTP client.
pub mod code_search;
/// Local file delivery.
pub mod delivery;
/// Shared HTTP error mapping.
pub mod http_error;
/// Identity provider adapters.
pub mod identity;
/// Log sinks.
pub mod log_sink;
/// Structured logger.
pub mod logger;

pub use code_search::{HttpCodeSearchApi, HttpCodeSearchApiConfig};
pub use delivery::LocalFileDelivery;
pub use identity::{FirebaseIdentity, FirebaseIdentityConfig};
pub use log_sink::{LogSink, MemoryLogSink, StderrLogSink};
pub use logger::JsonLogger;

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
