//! Local filesystem delivery: the CLI counterpart of a browser download.
//!
//! Each delivery writes into a temp file next to the target and renames it
//! into place, so a failed delivery never leaves a partial document.

use codescope_ports::{DeliveryReceipt, DeliveryRequest, FileDeliveryPort};
use codescope_shared::{ErrorEnvelope, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

const TEMP_PREFIX: &str = ".codescope-";
const TEMP_SUFFIX: &str = ".partial";

/// Writes delivered documents into one output directory.
#[derive(Debug, Clone)]
pub struct LocalFileDelivery {
    output_dir: PathBuf,
}

impl LocalFileDelivery {
    /// Deliver into `output_dir` (created on first use).
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Target directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl FileDeliveryPort for LocalFileDelivery {
    fn deliver(&self, request: DeliveryRequest) -> Result<DeliveryReceipt> {
        let target = self.output_dir.join(request.filename.as_str());
        let with_path = |error: std::io::Error| {
            ErrorEnvelope::from(error)
                .with_metadata("path", target.to_string_lossy().into_owned())
                .with_metadata("media_type", &*request.media_type)
        };

        std::fs::create_dir_all(&self.output_dir).map_err(with_path)?;

        // Dropping `staged` on any early return removes the temp file.
        let mut staged = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&self.output_dir)
            .map_err(with_path)?;
        staged.write_all(&request.bytes).map_err(with_path)?;
        staged.as_file().sync_all().map_err(with_path)?;
        staged
            .persist(&target)
            .map_err(|error| with_path(error.error))?;

        let bytes_written = u64::try_from(request.bytes.len()).unwrap_or(u64::MAX);
        tracing::debug!(
            path = %target.display(),
            bytes = bytes_written,
            media_type = %request.media_type,
            "delivered file"
        );

        Ok(DeliveryReceipt {
            location: target.to_string_lossy().into_owned().into_boxed_str(),
            filename: request.filename,
            bytes_written,
        })
    }
}
