//! Code snippet detail and explanation records.

use crate::{SnippetId, WireValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of `GET /api/code/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSnippetDetail {
    /// Snippet identifier.
    pub id: SnippetId,
    /// Repository label; older service builds send it as `repository`.
    #[serde(default, alias = "repository", skip_serializing_if = "WireValue::is_absent")]
    pub repository_name: WireValue<Box<str>>,
    /// Source file path.
    #[serde(default, skip_serializing_if = "WireValue::is_absent")]
    pub file_path: WireValue<Box<str>>,
    /// Full snippet or file text.
    #[serde(default, skip_serializing_if = "WireValue::is_absent")]
    pub code: WireValue<Box<str>>,
}

/// Body of `POST /api/code/{id}/explain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeExplanation {
    /// Generated explanation text.
    pub explanation: Box<str>,
}

/// Text placed on the clipboard by "copy code": the code plus its source.
#[must_use]
pub fn copy_with_attribution(code: impl fmt::Display, file_path: impl fmt::Display) -> String {
    format!("{code}\n\nSource: {file_path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn repository_alias_is_accepted() -> Result<(), Box<dyn Error>> {
        let detail: CodeSnippetDetail = serde_json::from_value(serde_json::json!({
            "id": 5,
            "repository": "demo",
            "file_path": "src/lib.rs",
            "code": "fn main() {}"
        }))?;
        assert_eq!(detail.repository_name.as_deref(), Some("demo"));
        Ok(())
    }

    #[test]
    fn null_repository_differs_from_missing_code() -> Result<(), Box<dyn Error>> {
        let detail: CodeSnippetDetail = serde_json::from_value(serde_json::json!({
            "id": 5,
            "repository_name": null,
            "file_path": "src/lib.rs"
        }))?;
        assert_eq!(detail.repository_name, WireValue::Null);
        assert_eq!(detail.code, WireValue::Absent);
        assert_eq!(
            copy_with_attribution(&detail.code, &detail.file_path),
            "undefined\n\nSource: src/lib.rs"
        );
        Ok(())
    }

    #[test]
    fn attribution_appends_source_line() {
        assert_eq!(
            copy_with_attribution("print(1)", "a.py"),
            "print(1)\n\nSource: a.py"
        );
    }
}
