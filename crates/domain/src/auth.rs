//! Credentials and identity-provider error mapping.

use codescope_shared::{ErrorCode, ErrorEnvelope, SecretString};
use std::fmt;

/// Message shown when either credential field is empty.
pub const CREDENTIALS_REQUIRED_MESSAGE: &str = "Email and password are required";

/// Fallback message for provider errors without a dedicated mapping.
pub const GENERIC_AUTH_MESSAGE: &str = "Something went wrong. Please try again";

/// Email + password pair checked for presence before any provider call.
#[derive(Debug, Clone)]
pub struct Credentials {
    email: Box<str>,
    password: SecretString,
}

impl Credentials {
    /// Both fields must be non-empty.
    pub fn new(email: impl AsRef<str>, password: impl Into<SecretString>) -> Result<Self, CredentialsError> {
        let email = email.as_ref();
        let password = password.into();
        if email.is_empty() || password.is_empty() {
            return Err(CredentialsError::Missing);
        }
        Ok(Self {
            email: Box::from(email),
            password,
        })
    }

    /// Email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Password (redacted on Display/Debug).
    #[must_use]
    pub const fn password(&self) -> &SecretString {
        &self.password
    }
}

/// Credential validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsError {
    /// Email or password is empty.
    Missing,
}

impl fmt::Display for CredentialsError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => formatter.write_str(CREDENTIALS_REQUIRED_MESSAGE),
        }
    }
}

impl std::error::Error for CredentialsError {}

impl From<CredentialsError> for ErrorEnvelope {
    fn from(error: CredentialsError) -> Self {
        Self::expected(ErrorCode::new("auth", "credentials_required"), error.to_string())
    }
}

/// Normalized identity-provider error code (`auth/*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    /// `auth/user-not-found`
    UserNotFound,
    /// `auth/wrong-password`
    WrongPassword,
    /// `auth/invalid-credential`
    InvalidCredential,
    /// `auth/email-already-in-use`
    EmailAlreadyInUse,
    /// `auth/weak-password`
    WeakPassword,
    /// Any other provider code, kept as received.
    Other(Box<str>),
}

impl AuthErrorCode {
    /// Map a raw provider code.
    ///
    /// Accepts both REST error strings (`EMAIL_NOT_FOUND`, `WEAK_PASSWORD : ...`)
    /// and already-normalized `auth/*` codes.
    #[must_use]
    pub fn from_provider_code(raw: &str) -> Self {
        let head = raw.split(':').next().unwrap_or(raw).trim();
        match head {
            "EMAIL_NOT_FOUND" | "auth/user-not-found" => Self::UserNotFound,
            "INVALID_PASSWORD" | "auth/wrong-password" => Self::WrongPassword,
            "INVALID_LOGIN_CREDENTIALS" | "auth/invalid-credential" => Self::InvalidCredential,
            "EMAIL_EXISTS" | "auth/email-already-in-use" => Self::EmailAlreadyInUse,
            "WEAK_PASSWORD" | "auth/weak-password" => Self::WeakPassword,
            _ => Self::Other(Box::from(raw.trim())),
        }
    }

    /// Normalized code text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::InvalidCredential => "auth/invalid-credential",
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::WeakPassword => "auth/weak-password",
            Self::Other(raw) => raw,
        }
    }

    /// Human-readable message for the code.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::UserNotFound => "User not found",
            Self::WrongPassword => "Incorrect password",
            Self::InvalidCredential => "Invalid login credentials",
            Self::EmailAlreadyInUse => "An account with this email already exists",
            Self::WeakPassword => "Password should be at least 6 characters",
            Self::Other(_) => GENERIC_AUTH_MESSAGE,
        }
    }

    /// Convert into a user-facing envelope with the provider code in metadata.
    #[must_use]
    pub fn into_envelope(self) -> ErrorEnvelope {
        let code = match self {
            Self::Other(_) => ErrorCode::new("auth", "provider_error"),
            _ => ErrorCode::new("auth", "rejected"),
        };
        let message = self.user_message();
        ErrorEnvelope::expected(code, message).with_metadata("auth_code", self.as_str())
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySession {
    /// Provider user id.
    pub uid: Box<str>,
    /// Email on record.
    pub email: Box<str>,
    /// Bearer token issued by the provider.
    pub id_token: SecretString,
}
