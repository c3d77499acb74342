//! Identity provider adapters.

/// Firebase Identity Toolkit adapter.
pub mod firebase;

pub use firebase::{FirebaseIdentity, FirebaseIdentityConfig};
