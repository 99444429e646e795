//! Word → PDF conversion through a headless LibreOffice process.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::imaging::ConversionError;

/// Converts a word-processor document into a PDF written under `out_dir`.
///
/// The caller owns `out_dir` and is responsible for removing it.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn convert_to_pdf(&self, input: &Path, out_dir: &Path)
        -> Result<PathBuf, ConversionError>;
}

pub struct LibreOfficeConverter {
    binary: String,
}

impl LibreOfficeConverter {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl DocumentConverter for LibreOfficeConverter {
    async fn convert_to_pdf(
        &self,
        input: &Path,
        out_dir: &Path,
    ) -> Result<PathBuf, ConversionError> {
        let stem = input.file_stem().ok_or_else(|| {
            ConversionError::Converter(format!("{} has no file name", input.display()))
        })?;

        debug!("Converting {} with {}", input.display(), self.binary);
        let output = Command::new(&self.binary)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(out_dir)
            .arg(input)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ConversionError::Converter(format!("failed to launch {}: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("{} exited with {}: {}", self.binary, output.status, stderr.trim());
            return Err(ConversionError::Converter(format!(
                "{} exited with {}",
                self.binary, output.status
            )));
        }

        let pdf_path = out_dir.join(format!("{}.pdf", stem.to_string_lossy()));
        if !tokio::fs::try_exists(&pdf_path).await? {
            return Err(ConversionError::Converter(format!(
                "{} produced no PDF for {}",
                self.binary,
                input.display()
            )));
        }

        Ok(pdf_path)
    }
}
