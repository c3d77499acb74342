//! File delivery boundary contract.
//!
//! Delivery hands a finished document to the user. A browser would trigger a
//! download; the CLI writes into an output directory. Either way the caller
//! supplies bytes, a bare filename, and a media type, and delivery either
//! completes or leaves nothing behind.

use codescope_shared::{ErrorCode, ErrorEnvelope, Result};
use std::fmt;

/// Media type for Markdown exports.
pub const MEDIA_TYPE_MARKDOWN: &str = "text/markdown";

/// A bare file name: non-empty, no separators, not `.` or `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeliveryFilename(Box<str>);

impl DeliveryFilename {
    /// Validate an untrusted file name.
    pub fn parse(input: &str) -> Result<Self> {
        let reject = |reason: &str| {
            ErrorEnvelope::expected(ErrorCode::invalid_input(), reason.to_owned())
                .with_metadata("filename", input)
        };

        if input.trim().is_empty() {
            return Err(reject("filename must be non-empty"));
        }
        if input.contains(['/', '\\', '\0']) {
            return Err(reject("filename must not contain path separators"));
        }
        if input == "." || input == ".." {
            return Err(reject("filename must not be a directory reference"));
        }
        Ok(Self(Box::from(input)))
    }

    /// Borrow the file name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeliveryFilename {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Document handed to a delivery implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    /// File contents.
    pub bytes: Vec<u8>,
    /// Target file name.
    pub filename: DeliveryFilename,
    /// Media type (e.g. [`MEDIA_TYPE_MARKDOWN`]).
    pub media_type: Box<str>,
}

/// Where a delivered document ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Delivered file name.
    pub filename: DeliveryFilename,
    /// Implementation-specific location (a path for local delivery).
    pub location: Box<str>,
    /// Number of bytes delivered.
    pub bytes_written: u64,
}

/// Boundary contract for handing files to the user.
pub trait FileDeliveryPort: Send + Sync {
    /// Deliver one document. Implementations must not leave partial output
    /// behind on failure.
    fn deliver(&self, request: DeliveryRequest) -> Result<DeliveryReceipt>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_accepts_plain_names() -> Result<()> {
        assert_eq!(DeliveryFilename::parse("results.md")?.as_str(), "results.md");
        assert_eq!(DeliveryFilename::parse(".hidden.md")?.as_str(), ".hidden.md");
        Ok(())
    }

    #[test]
    fn filename_rejects_traversal_and_separators() {
        for input in ["", "  ", ".", "..", "../x.md", "dir/x.md", "dir\\x.md"] {
            let error = DeliveryFilename::parse(input).err();
            assert_eq!(
                error.map(|error| error.code),
                Some(ErrorCode::invalid_input()),
                "{input:?} should be rejected"
            );
        }
    }
}
