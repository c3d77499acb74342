//! Identity provider boundary contract.

use crate::BoxFuture;
use codescope_domain::{Credentials, IdentitySession};
use codescope_shared::{RequestContext, Result};

/// Email/password identity provider.
///
/// Rejections are reported as expected errors whose message is already
/// user-facing (see [`codescope_domain::AuthErrorCode`]).
pub trait IdentityPort: Send + Sync {
    /// Sign in an existing account.
    fn sign_in(
        &self,
        ctx: &RequestContext,
        credentials: Credentials,
    ) -> BoxFuture<'_, Result<IdentitySession>>;

    /// Create a new account.
    fn sign_up(
        &self,
        ctx: &RequestContext,
        credentials: Credentials,
    ) -> BoxFuture<'_, Result<IdentitySession>>;
}
