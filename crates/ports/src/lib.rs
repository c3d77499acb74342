//! # codescope-ports
//!
//! Port traits for the codescope hexagonal architecture.
//!
//! This crate defines the interfaces between the use cases and the
//! outside world (remote API, identity provider, file delivery, logging).
//! It depends only on `domain` and `shared`.

use std::future::Future;
use std::pin::Pin;

/// Boxed future used by async port traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod api;
pub mod delivery;
pub mod identity;
pub mod logger;

pub use api::*;
pub use delivery::*;
pub use identity::*;
pub use logger::*;
