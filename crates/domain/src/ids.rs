//! Opaque identifiers issued by the remote service.
//!
//! The service hands out ids as either JSON numbers or strings. The client
//! never interprets them; it only echoes them back in URLs and output.

use codescope_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

/// Validation failures for identifiers typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The identifier is empty after trimming.
    Empty {
        /// Which identifier was being parsed (e.g. "repository").
        kind: &'static str,
        /// Length of the raw input before trimming.
        input_length: usize,
    },
}

impl IdError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::Empty { .. } => ErrorCode::new("domain", "invalid_id"),
        }
    }
}

impl fmt::Display for IdError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { kind, .. } => write!(formatter, "{kind} id must be non-empty"),
        }
    }
}

impl std::error::Error for IdError {}

impl From<IdError> for ErrorEnvelope {
    fn from(error: IdError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            IdError::Empty { kind, input_length } => envelope
                .with_metadata("id_kind", kind)
                .with_metadata("input_length", input_length.to_string()),
        }
    }
}

/// A number-or-string identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpaqueId {
    /// JSON number id (`1`, `18446744073709551615`), echoed back unchanged.
    Number(Number),
    /// String id (`"a1b2"`), including anything typed by the user.
    Text(Box<str>),
}

impl OpaqueId {
    /// Parse user input. The trimmed text is kept as typed, so `007`
    /// stays `007` in request paths.
    fn parse(input: &str, kind: &'static str) -> Result<Self, IdError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(IdError::Empty {
                kind,
                input_length: input.len(),
            });
        }
        Ok(Self::Text(Box::from(trimmed)))
    }
}

impl fmt::Display for OpaqueId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => value.fmt(formatter),
            Self::Text(value) => formatter.write_str(value),
        }
    }
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(OpaqueId);

        impl $name {
            /// Parse an identifier typed by the user.
            pub fn parse(input: impl AsRef<str>) -> Result<Self, IdError> {
                OpaqueId::parse(input.as_ref(), $kind).map(Self)
            }

            /// Borrow the underlying opaque id.
            #[must_use]
            pub const fn as_opaque(&self) -> &OpaqueId {
                &self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(OpaqueId::Number(Number::from(value)))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(formatter)
            }
        }
    };
}

opaque_id!(
    /// Identifier of a registered repository.
    RepositoryId,
    "repository"
);
opaque_id!(
    /// Identifier of a code snippet returned by search.
    SnippetId,
    "snippet"
);
opaque_id!(
    /// Identifier of a search-history entry.
    HistoryId,
    "history"
);
