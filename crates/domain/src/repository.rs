//! Repository records and the add-repository request.

use crate::RepositoryId;
use codescope_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Repository summary as returned by the list and detail endpoints.
///
/// The service is inconsistent about field naming, so both the snake_case
/// and camelCase spellings of the count and file list are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    /// Repository identifier.
    pub id: RepositoryId,
    /// Human-readable name.
    #[serde(default)]
    pub name: Box<str>,
    /// Number of files, when reported.
    #[serde(default, alias = "fileCount", skip_serializing_if = "Option::is_none")]
    pub file_count: Option<u64>,
    /// Whether the repository has been indexed.
    #[serde(default)]
    pub indexed: bool,
    /// Server-side status label (e.g. `indexing`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Box<str>>,
    /// Source path the repository was registered with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Box<str>>,
    /// Relative file paths, when the detail endpoint includes them.
    #[serde(default, alias = "files", skip_serializing_if = "Option::is_none")]
    pub file_list: Option<Vec<Box<str>>>,
    /// Long-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Box<str>>,
}

impl RepositorySummary {
    /// Returns true when the server reports indexing in progress.
    #[must_use]
    pub fn is_indexing(&self) -> bool {
        self.status.as_deref() == Some("indexing")
    }

    /// Status label shown next to the repository.
    #[must_use]
    pub const fn index_label(&self) -> &'static str {
        if self.indexed { "Indexed" } else { "Not Indexed" }
    }
}

/// How a repository is registered with the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryKind {
    /// Connect an existing repository by path or URL.
    #[default]
    Connect,
    /// Upload a local copy.
    Upload,
}

impl RepositoryKind {
    /// Parse the wire/CLI spelling.
    pub fn parse(input: &str) -> Result<Self, RepositoryError> {
        match input.trim() {
            "connect" => Ok(Self::Connect),
            "upload" => Ok(Self::Upload),
            other => Err(RepositoryError::InvalidKind {
                input: other.to_owned(),
            }),
        }
    }

    /// Wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Upload => "upload",
        }
    }
}

/// Payload for `POST /api/repositories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRepository {
    name: Box<str>,
    path: Box<str>,
    #[serde(rename = "type")]
    kind: RepositoryKind,
}

impl NewRepository {
    /// Build a request; name and path must be non-empty after trimming.
    pub fn new(
        name: impl AsRef<str>,
        path: impl AsRef<str>,
        kind: RepositoryKind,
    ) -> Result<Self, RepositoryError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(RepositoryError::MissingField { field: "name" });
        }
        let path = path.as_ref().trim();
        if path.is_empty() {
            return Err(RepositoryError::MissingField { field: "path" });
        }
        Ok(Self {
            name: Box::from(name),
            path: Box::from(path),
            kind,
        })
    }

    /// Repository name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Repository path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Registration kind.
    #[must_use]
    pub const fn kind(&self) -> RepositoryKind {
        self.kind
    }
}

/// Validation failures for repository input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A required field is empty.
    MissingField {
        /// Field name.
        field: &'static str,
    },
    /// The repository type is neither `connect` nor `upload`.
    InvalidKind {
        /// Trimmed input.
        input: String,
    },
}

impl RepositoryError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingField { .. } => ErrorCode::new("domain", "missing_repository_field"),
            Self::InvalidKind { .. } => ErrorCode::new("domain", "invalid_repository_type"),
        }
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(formatter, "repository {field} is required"),
            Self::InvalidKind { .. } => {
                formatter.write_str("repository type must be `connect` or `upload`")
            },
        }
    }
}

impl std::error::Error for RepositoryError {}

impl From<RepositoryError> for ErrorEnvelope {
    fn from(error: RepositoryError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            RepositoryError::MissingField { field } => envelope.with_metadata("field", field),
            RepositoryError::InvalidKind { input } => envelope.with_metadata("input", input),
        }
    }
}

/// Loose acknowledgement returned by mutating endpoints.
///
/// Empty bodies decode to the default value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Optional status message from the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Box<str>>,
    /// Optional success flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

/// Response to `POST /api/repositories/{id}/index`.
///
/// The client only needs to know the request was accepted; progress is
/// simulated locally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexingAccepted {
    /// Optional status label (e.g. `indexing`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Box<str>>,
    /// Optional status message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Box<str>>,
}
