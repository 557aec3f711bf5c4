//! Local uploads directory.
//!
//! Every write gets a fresh UUID file name, so concurrent requests never touch
//! the same file and no locking is needed.

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

const RENDERED_SUBDIR: &str = "rendered";

/// A resume PDF saved for the duration of one request.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub path: PathBuf,
    /// Name the user uploaded the file under.
    pub file_name: String,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    /// Creates the uploads directory tree if it does not exist.
    pub async fn ensure_dirs(&self) -> anyhow::Result<()> {
        let rendered = self.root.join(RENDERED_SUBDIR);
        tokio::fs::create_dir_all(&rendered)
            .await
            .with_context(|| format!("Failed to create uploads directory {}", rendered.display()))
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Checks name and size of an uploaded resume without touching the disk.
    pub fn validate(&self, file_name: &str, data: &[u8]) -> Result<(), AppError> {
        if data.is_empty() {
            return Err(AppError::Validation("The uploaded resume is empty.".to_string()));
        }
        if data.len() > self.max_bytes {
            return Err(AppError::Validation(format!(
                "The uploaded resume exceeds the {} byte limit.",
                self.max_bytes
            )));
        }
        if !file_name.to_ascii_lowercase().ends_with(".pdf") {
            return Err(AppError::Validation(
                "Only PDF resumes (.pdf) are supported.".to_string(),
            ));
        }
        Ok(())
    }

    /// Validates and stores an uploaded resume.
    pub async fn save_resume(&self, file_name: &str, data: &[u8]) -> Result<ResumeUpload, AppError> {
        self.validate(file_name, data)?;

        let path = self.root.join(format!("{}.pdf", Uuid::new_v4()));
        tokio::fs::write(&path, data)
            .await
            .with_context(|| format!("Failed to save resume to {}", path.display()))?;

        info!("Saved resume upload '{}' ({} bytes)", file_name, data.len());

        Ok(ResumeUpload {
            path,
            file_name: file_name.to_string(),
        })
    }

    /// Stores a generated PDF and returns the id it can be downloaded under.
    pub async fn save_rendered(&self, pdf: &[u8]) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        let path = self.rendered_path(id);
        tokio::fs::write(&path, pdf)
            .await
            .with_context(|| format!("Failed to save rendered PDF to {}", path.display()))?;
        Ok(id)
    }

    /// Reads a previously stored generated PDF.
    pub async fn load_rendered(&self, id: Uuid) -> Result<Vec<u8>, AppError> {
        let path = self.rendered_path(id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("Download {id} not found")))
            }
            Err(e) => Err(AppError::Internal(anyhow::anyhow!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn rendered_path(&self, id: Uuid) -> PathBuf {
        self.root.join(RENDERED_SUBDIR).join(format!("{id}.pdf"))
    }
}
