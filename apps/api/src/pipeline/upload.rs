//! Upload validation and the transient on-disk copy of an upload.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::imaging::DocumentFormat;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".docx", ".doc", ".txt", ".png", ".jpg", ".jpeg"];

/// A file as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Bytes,
}

/// An upload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    /// File-name component only; any client-supplied directories are dropped.
    pub file_name: String,
    pub format: DocumentFormat,
    pub size: usize,
}

impl ValidatedUpload {
    pub fn stem(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("resume")
    }
}

pub fn validate_upload(upload: &Upload) -> Result<ValidatedUpload, String> {
    let file_name = Path::new(&upload.filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| "Uploaded file has no file name".to_string())?
        .to_string();

    let format = DocumentFormat::from_path(Path::new(&file_name)).ok_or_else(|| {
        let extension = Path::new(&file_name)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_else(|| "(none)".to_string());
        format!(
            "Unsupported file type: {extension}. Allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )
    })?;

    let size = upload.bytes.len();
    if size == 0 {
        return Err("Uploaded file is empty".to_string());
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(format!(
            "File too large: {size} bytes (maximum {MAX_UPLOAD_BYTES} bytes)"
        ));
    }

    Ok(ValidatedUpload {
        file_name,
        format,
        size,
    })
}

/// Upload bytes persisted for the duration of one request.
///
/// The file is removed when this value is dropped, whichever way the
/// request ends.
#[derive(Debug)]
pub struct TransientUpload {
    path: PathBuf,
}

impl TransientUpload {
    /// Writes `bytes` to `<dir>/<uuid>_<file_name>`.
    pub async fn save(dir: &Path, file_name: &str, bytes: &[u8]) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let upload = Self {
            path: dir.join(format!("{}_{}", Uuid::new_v4(), file_name)),
        };
        // `upload` already owns the path, so a partial write is cleaned up too.
        tokio::fs::write(&upload.path, bytes).await?;
        debug!("Saved upload to {}", upload.path.display());
        Ok(upload)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TransientUpload {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed transient upload {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove transient upload {}: {e}",
                self.path.display()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(filename: &str, bytes: Vec<u8>) -> Upload {
        Upload {
            filename: filename.to_string(),
            bytes: Bytes::from(bytes),
        }
    }

    #[test]
    fn test_accepts_every_supported_extension() {
        for ext in ALLOWED_EXTENSIONS {
            let validated = validate_upload(&upload(&format!("cv{ext}"), vec![1])).unwrap();
            assert_eq!(validated.size, 1);
        }
        assert_eq!(
            validate_upload(&upload("CV.PDF", vec![1])).unwrap().format,
            DocumentFormat::Pdf
        );
    }

    #[test]
    fn test_rejects_unsupported_extension() {
        let err = validate_upload(&upload("cv.exe", vec![1])).unwrap_err();
        assert!(err.contains("Unsupported file type: .exe"));
        assert!(validate_upload(&upload("README", vec![1])).is_err());
    }

    #[test]
    fn test_rejects_empty_file() {
        let err = validate_upload(&upload("cv.pdf", vec![])).unwrap_err();
        assert_eq!(err, "Uploaded file is empty");
    }

    #[test]
    fn test_size_ceiling() {
        assert!(validate_upload(&upload("cv.pdf", vec![0; MAX_UPLOAD_BYTES])).is_ok());
        let err = validate_upload(&upload("cv.pdf", vec![0; 11 * 1024 * 1024])).unwrap_err();
        assert!(err.starts_with("File too large"));
    }

    #[test]
    fn test_strips_client_directories() {
        let validated = validate_upload(&upload("../../etc/cv.txt", vec![1])).unwrap();
        assert_eq!(validated.file_name, "cv.txt");
        assert_eq!(validated.stem(), "cv");
    }

    #[tokio::test]
    async fn test_transient_upload_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = dir.path().join("uploads");

        let saved = TransientUpload::save(&uploads, "cv.pdf", b"%PDF").await.unwrap();
        let path = saved.path().to_path_buf();
        assert!(path.exists());
        assert!(path.file_name().unwrap().to_str().unwrap().ends_with("_cv.pdf"));
        assert_eq!(path.extension().unwrap(), "pdf");

        drop(saved);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_same_name_uploads_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let a = TransientUpload::save(dir.path(), "cv.pdf", b"a").await.unwrap();
        let b = TransientUpload::save(dir.path(), "cv.pdf", b"b").await.unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(tokio::fs::read(a.path()).await.unwrap(), b"a");
    }
}
