//! Server-side file storage for the download and upload endpoints.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use cityinfo_core::AppError;

/// The single artifact served by the download endpoint.
pub const DOWNLOAD_ARTIFACT: &str = "getting-acquainted-with-aspnet-core-slides.pdf";

/// Largest accepted upload (20 MiB).
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Only this declared content type is accepted for uploads.
pub const ALLOWED_UPLOAD_CONTENT_TYPE: &str = "application/pdf";

/// Fallback when the extension maps to no known type.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Message returned for every rejected upload.
pub const INVALID_UPLOAD_MESSAGE: &str = "No file or invalid input";

/// Plain-text body of a successful upload.
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Your file has been uploaded successfully.";

/// A file read back for download.
#[derive(Debug)]
pub struct DownloadedFile {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub file_name: String,
}

/// Resolve a content type from the extension of `path`.
pub fn content_type_for(path: &Path) -> &'static str {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

/// Reject uploads that are empty, too large, or not declared as PDF.
pub fn validate_upload(len: usize, content_type: Option<&str>) -> Result<(), AppError> {
    if len == 0 || len > MAX_UPLOAD_BYTES || content_type != Some(ALLOWED_UPLOAD_CONTENT_TYPE) {
        return Err(AppError::Validation(INVALID_UPLOAD_MESSAGE.to_string()));
    }
    Ok(())
}

/// Locations of the download artifact and the upload target directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    files_dir: PathBuf,
    upload_dir: PathBuf,
}

impl FileStorage {
    pub fn new(files_dir: impl Into<PathBuf>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            files_dir: files_dir.into(),
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Read the download artifact. `NotFound` when it is absent.
    pub async fn read_artifact(&self) -> Result<DownloadedFile, AppError> {
        let path = self.files_dir.join(DOWNLOAD_ARTIFACT);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound(format!("{} is missing", path.display())));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(DownloadedFile {
            bytes,
            content_type: content_type_for(&path),
            file_name: DOWNLOAD_ARTIFACT.to_string(),
        })
    }

    /// Write an already validated upload under a generated name and return its path.
    ///
    /// The client-supplied file name is never used.
    pub async fn store_upload(&self, bytes: &[u8]) -> Result<PathBuf, AppError> {
        let path = self
            .upload_dir
            .join(format!("uploaded_file_{}.pdf", Uuid::new_v4()));

        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        Ok(path)
    }
}
