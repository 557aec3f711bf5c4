//! The two interchangeable ways of producing an optimized resume.
//!
//! `DirectLlmBackend` (default): extract text → rewrite prompt → LLM → Markdown.
//! `RemoteApiBackend`: forward the PDF to a remote `/get-optimised-resume`
//! endpoint and receive a rendered PDF back.
//!
//! `AppState` holds an `Arc<dyn ResumeBackend>`, chosen at startup from `OPTIMIZER_BACKEND`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use tracing::info;

use crate::errors::AppError;
use crate::extraction::TextExtractor;
use crate::llm_client::prompts::REWRITE_SYSTEM;
use crate::llm_client::{CompletionClient, CompletionRequest};
use crate::optimizer::prompts::build_rewrite_prompt;
use crate::uploads::ResumeUpload;

/// Sampling temperature for the rewrite call.
pub const REWRITE_TEMPERATURE: f32 = 0.2;

/// What a backend hands back. At least one of the fields is set on success.
#[derive(Debug, Clone, Default)]
pub struct OptimizedResume {
    /// Markdown produced by the model, unaltered.
    pub markdown: Option<String>,
    /// Rendered PDF, when the backend produces one.
    pub pdf: Option<Bytes>,
}

#[async_trait]
pub trait ResumeBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn optimize(
        &self,
        upload: &ResumeUpload,
        jd_text: &str,
    ) -> Result<OptimizedResume, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// DirectLlmBackend
// ────────────────────────────────────────────────────────────────────────────

pub struct DirectLlmBackend {
    extractor: Arc<dyn TextExtractor>,
    llm: Arc<dyn CompletionClient>,
    model: String,
}

impl DirectLlmBackend {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        llm: Arc<dyn CompletionClient>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            extractor,
            llm,
            model: model.into(),
        }
    }

    /// Rewrites already-extracted resume text. Returns the model's Markdown unaltered.
    pub async fn rewrite(&self, resume_text: &str, jd_text: &str) -> Result<String, AppError> {
        let prompt = build_rewrite_prompt(resume_text, jd_text);

        let markdown = self
            .llm
            .complete(CompletionRequest {
                system: REWRITE_SYSTEM,
                prompt: &prompt,
                model: &self.model,
                temperature: REWRITE_TEMPERATURE,
            })
            .await
            .map_err(|e| AppError::Generation(e.to_string()))?;

        info!("Rewrite produced {} characters of Markdown", markdown.len());
        Ok(markdown)
    }
}

#[async_trait]
impl ResumeBackend for DirectLlmBackend {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn optimize(
        &self,
        upload: &ResumeUpload,
        jd_text: &str,
    ) -> Result<OptimizedResume, AppError> {
        let resume_text = self.extractor.extract(&upload.path).await?;
        let markdown = self.rewrite(&resume_text, jd_text).await?;

        Ok(OptimizedResume {
            markdown: Some(markdown),
            pdf: None,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RemoteApiBackend
// ────────────────────────────────────────────────────────────────────────────

pub struct RemoteApiBackend {
    client: Client,
    endpoint: String,
}

impl RemoteApiBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/get-optimised-resume", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ResumeBackend for RemoteApiBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn optimize(
        &self,
        upload: &ResumeUpload,
        jd_text: &str,
    ) -> Result<OptimizedResume, AppError> {
        let data = tokio::fs::read(&upload.path).await.map_err(|e| {
            AppError::Extraction(format!("could not open '{}': {e}", upload.path.display()))
        })?;

        let part = Part::bytes(data)
            .file_name(upload.file_name.clone())
            .mime_str("application/pdf")
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid MIME type: {e}")))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("jd_string", jd_text)])
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::RemoteApi {
                status: 0,
                body: e.to_string(),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RemoteApi {
                status: status.as_u16(),
                body,
            });
        }

        let pdf = response.bytes().await.map_err(|e| AppError::RemoteApi {
            status: status.as_u16(),
            body: format!("failed to read response body: {e}"),
        })?;

        info!("Remote backend returned a {} byte PDF", pdf.len());

        Ok(OptimizedResume {
            markdown: None,
            pdf: Some(pdf),
        })
    }
}
