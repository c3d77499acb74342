//! Sign-in and sign-up use cases.

use crate::client::{field, log_outcome};
use codescope_domain::{Credentials, GENERIC_AUTH_MESSAGE, IdentitySession};
use codescope_ports::{IdentityPort, LogFields, LoggerPort};
use codescope_shared::{ErrorCode, RequestContext, Result, ResultExt, SecretString};
use std::sync::Arc;

/// Dependencies required by the auth use cases.
#[derive(Clone)]
pub struct AuthDeps {
    /// Identity provider.
    pub identity: Arc<dyn IdentityPort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// Email and password as entered.
#[derive(Debug, Clone)]
pub struct AuthInput {
    /// Email address.
    pub email: Box<str>,
    /// Password.
    pub password: SecretString,
}

#[derive(Debug, Clone, Copy)]
enum AuthFlow {
    SignIn,
    SignUp,
}

impl AuthFlow {
    const fn operation(self) -> &'static str {
        match self {
            Self::SignIn => "auth.sign_in",
            Self::SignUp => "auth.sign_up",
        }
    }
}

/// Sign in an existing account.
///
/// Empty email or password fails without contacting the provider.
#[tracing::instrument(name = "sign_in", skip_all)]
pub async fn sign_in(
    ctx: &RequestContext,
    deps: &AuthDeps,
    input: AuthInput,
) -> Result<IdentitySession> {
    authenticate(ctx, deps, input, AuthFlow::SignIn).await
}

/// Create an account and sign it in.
#[tracing::instrument(name = "sign_up", skip_all)]
pub async fn sign_up(
    ctx: &RequestContext,
    deps: &AuthDeps,
    input: AuthInput,
) -> Result<IdentitySession> {
    authenticate(ctx, deps, input, AuthFlow::SignUp).await
}

async fn authenticate(
    ctx: &RequestContext,
    deps: &AuthDeps,
    input: AuthInput,
    flow: AuthFlow,
) -> Result<IdentitySession> {
    let credentials = Credentials::new(&input.email, input.password)?;
    ctx.ensure_not_cancelled("auth.start")?;

    let response = match flow {
        AuthFlow::SignIn => deps.identity.sign_in(ctx, credentials).await,
        AuthFlow::SignUp => deps.identity.sign_up(ctx, credentials).await,
    };
    // Provider rejections already carry their mapped message.
    let result = match response {
        Err(error) if error.code.namespace() == "auth" => Err(error),
        other => other.user_facing(ErrorCode::new("auth", "provider_error"), GENERIC_AUTH_MESSAGE),
    };

    let mut fields = LogFields::from([field("email", &*input.email)]);
    if let Ok(session) = &result {
        fields.insert("uid".into(), (&*session.uid).into());
    }
    log_outcome(deps.logger.as_ref(), flow.operation(), &result, fields);
    result
}
