//! Firebase Identity Toolkit adapter (email/password).

use crate::http_error::{
    HttpErrorContext, cancelled_error, invalid_response, map_status_error, map_transport_error,
};
use codescope_config::ValidatedClientConfig;
use codescope_domain::{AuthErrorCode, Credentials, IdentitySession};
use codescope_ports::{BoxFuture, IdentityPort};
use codescope_shared::{
    ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result, SecretString,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const SERVICE: &str = "identity";
const SIGN_IN_METHOD: &str = "accounts:signInWithPassword";
const SIGN_UP_METHOD: &str = "accounts:signUp";

/// Firebase adapter configuration.
#[derive(Debug, Clone)]
pub struct FirebaseIdentityConfig {
    /// Identity Toolkit base URL (e.g. `https://identitytoolkit.googleapis.com/v1`).
    pub base_url: Box<str>,
    /// Web API key sent as the `key` query parameter.
    pub api_key: SecretString,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl FirebaseIdentityConfig {
    /// Build from the validated client config plus the env-provided key.
    #[must_use]
    pub fn from_client_config(config: &ValidatedClientConfig, api_key: SecretString) -> Self {
        Self {
            base_url: config.identity.base_url.clone().into_boxed_str(),
            api_key,
            timeout_ms: config.limits().identity_timeout_ms.get(),
        }
    }
}

/// Identity Toolkit REST implementation of [`IdentityPort`].
pub struct FirebaseIdentity {
    client: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl FirebaseIdentity {
    /// Create the adapter.
    pub fn new(config: &FirebaseIdentityConfig) -> Result<Self> {
        if config.api_key.expose().trim().is_empty() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::new("auth", "missing_api_key"),
                "identity api key must be set",
            ));
        }
        let base_url = Url::parse(config.base_url.trim()).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                format!("invalid identity base url: {error}"),
            )
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "identity base url cannot carry a path",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("auth", "client_init_failed"),
                    format!("failed to build identity client: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, method: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ErrorEnvelope::invariant(
                    ErrorCode::internal(),
                    "identity base url cannot carry a path",
                )
            })?
            .pop_if_empty()
            .push(method);
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose());
        Ok(url)
    }

    async fn exchange(
        &self,
        ctx: &RequestContext,
        method: &'static str,
        credentials: Credentials,
        error_ctx: HttpErrorContext,
    ) -> Result<IdentitySession> {
        ctx.ensure_not_cancelled(error_ctx.operation)?;
        let url = self.endpoint(method)?;
        let body = PasswordRequest {
            email: credentials.email(),
            password: credentials.password().expose(),
            return_secure_token: true,
        };

        let response = tokio::select! {
            () = ctx.cancelled() => return Err(cancelled_error(error_ctx.operation)),
            result = self.client.post(url).json(&body).send() => {
                result.map_err(|error| map_transport_error(error, error_ctx))?
            }
        };

        let status = response.status();
        let payload = tokio::select! {
            () = ctx.cancelled() => return Err(cancelled_error(error_ctx.operation)),
            result = response.bytes() => {
                result.map_err(|error| map_transport_error(error, error_ctx))?
            }
        };

        if !status.is_success() {
            return Err(map_identity_error(status, &payload, error_ctx));
        }

        let session: PasswordResponse = serde_json::from_slice(&payload)
            .map_err(|error| invalid_response(&error, error_ctx))?;
        Ok(IdentitySession {
            uid: session.local_id.into_boxed_str(),
            email: session
                .email
                .unwrap_or_else(|| credentials.email().to_owned())
                .into_boxed_str(),
            id_token: SecretString::from(session.id_token),
        })
    }
}

impl IdentityPort for FirebaseIdentity {
    fn sign_in(
        &self,
        ctx: &RequestContext,
        credentials: Credentials,
    ) -> BoxFuture<'_, Result<IdentitySession>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let error_ctx = HttpErrorContext {
                service: SERVICE,
                operation: "identity.sign_in",
                endpoint: "POST accounts:signInWithPassword",
            };
            self.exchange(&ctx, SIGN_IN_METHOD, credentials, error_ctx)
                .await
        })
    }

    fn sign_up(
        &self,
        ctx: &RequestContext,
        credentials: Credentials,
    ) -> BoxFuture<'_, Result<IdentitySession>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let error_ctx = HttpErrorContext {
                service: SERVICE,
                operation: "identity.sign_up",
                endpoint: "POST accounts:signUp",
            };
            self.exchange(&ctx, SIGN_UP_METHOD, credentials, error_ctx)
                .await
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
}

#[derive(Deserialize)]
struct ProviderErrorResponse {
    error: ProviderErrorDetail,
}

#[derive(Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

/// 4xx bodies carrying a provider code become user-facing auth errors;
/// everything else goes through the generic status mapping.
fn map_identity_error(
    status: reqwest::StatusCode,
    payload: &[u8],
    error_ctx: HttpErrorContext,
) -> ErrorEnvelope {
    if status.is_client_error()
        && let Ok(parsed) = serde_json::from_slice::<ProviderErrorResponse>(payload)
    {
        return AuthErrorCode::from_provider_code(&parsed.error.message)
            .into_envelope()
            .with_metadata("operation", error_ctx.operation)
            .with_metadata("status", status.as_u16().to_string());
    }
    map_status_error(status, payload, error_ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_colon_and_adds_key() -> Result<()> {
        let identity = FirebaseIdentity::new(&FirebaseIdentityConfig {
            base_url: "https://identitytoolkit.googleapis.com/v1".into(),
            api_key: SecretString::from("AIza-test"),
            timeout_ms: 1_000,
        })?;
        let url = identity.endpoint(SIGN_IN_METHOD)?;
        assert_eq!(
            url.as_str(),
            "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword?key=AIza-test"
        );
        Ok(())
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let result = FirebaseIdentity::new(&FirebaseIdentityConfig {
            base_url: "https://identitytoolkit.googleapis.com/v1".into(),
            api_key: SecretString::from(" "),
            timeout_ms: 1_000,
        });
        assert_eq!(
            result.err().map(|error| error.code),
            Some(ErrorCode::new("auth", "missing_api_key"))
        );
    }

    #[test]
    fn provider_codes_map_to_user_messages() {
        let ctx = HttpErrorContext {
            service: SERVICE,
            operation: "identity.sign_up",
            endpoint: "POST accounts:signUp",
        };
        let payload =
            br#"{"error":{"code":400,"message":"WEAK_PASSWORD : Password should be at least 6 characters"}}"#;
        let envelope = map_identity_error(reqwest::StatusCode::BAD_REQUEST, payload, ctx);
        assert_eq!(envelope.message, "Password should be at least 6 characters");
        assert_eq!(
            envelope.metadata.get("auth_code").map(String::as_str),
            Some("auth/weak-password")
        );

        let envelope =
            map_identity_error(reqwest::StatusCode::SERVICE_UNAVAILABLE, b"down", ctx);
        assert_eq!(envelope.code, ErrorCode::dependency_unavailable());
    }
}
