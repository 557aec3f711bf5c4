//! Resume optimization, the use-case boundary between the UI and the backends.
//!
//! Flow: validate → backend.optimize (extract → prompt → LLM, or remote call) → outcome.
//!
//! Nothing is raised past this function. Every failure becomes a status
//! message with no display text, which is what the presentation layer shows.

use bytes::Bytes;
use tracing::{info, warn};

use crate::errors::{AppError, MISSING_INPUT_MESSAGE};
use crate::optimizer::backend::ResumeBackend;
use crate::uploads::ResumeUpload;

pub const SUCCESS_MESSAGE: &str = "Resume optimized successfully!";

/// Result of one optimize request, ready for display.
#[derive(Debug, Clone, Default)]
pub struct OptimizeOutcome {
    pub display_text: Option<String>,
    pub status_message: String,
    pub pdf: Option<Bytes>,
}

impl OptimizeOutcome {
    pub fn failed(error: &AppError) -> Self {
        Self {
            display_text: None,
            status_message: error.status_message(),
            pdf: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.display_text.is_some() || self.pdf.is_some()
    }
}

/// Rejects a request before any I/O when the resume or job description is missing.
pub fn validate_inputs<T>(resume: Option<T>, jd_text: &str) -> Result<T, AppError> {
    match resume {
        Some(resume) if !jd_text.trim().is_empty() => Ok(resume),
        _ => Err(AppError::Validation(MISSING_INPUT_MESSAGE.to_string())),
    }
}

/// Optimizes an uploaded resume against a job description.
pub async fn optimize(
    backend: &dyn ResumeBackend,
    upload: Option<&ResumeUpload>,
    jd_text: &str,
) -> OptimizeOutcome {
    let upload = match validate_inputs(upload, jd_text) {
        Ok(upload) => upload,
        Err(e) => return OptimizeOutcome::failed(&e),
    };

    info!(
        "Optimizing '{}' with the {} backend",
        upload.file_name,
        backend.name()
    );

    match backend.optimize(upload, jd_text).await {
        Ok(resume) => OptimizeOutcome {
            display_text: resume.markdown,
            status_message: SUCCESS_MESSAGE.to_string(),
            pdf: resume.pdf,
        },
        Err(e) => {
            warn!("Optimization of '{}' failed: {e}", upload.file_name);
            OptimizeOutcome::failed(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::extraction::TextExtractor;
    use crate::llm_client::{CompletionClient, CompletionRequest, LlmError};
    use crate::optimizer::backend::DirectLlmBackend;

    const RESUME: &str = "Jane Doe, Software Engineer, 5 years Python";
    const JD: &str = "Seeking Go developer with 3+ years distributed systems";

    struct FixedText(&'static str);

    #[async_trait]
    impl TextExtractor for FixedText {
        async fn extract(&self, _path: &Path) -> Result<String, AppError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingExtractor;

    #[async_trait]
    impl TextExtractor for FailingExtractor {
        async fn extract(&self, _path: &Path) -> Result<String, AppError> {
            Err(AppError::Extraction(
                "PDF contains no extractable text".to_string(),
            ))
        }
    }

    /// Counts calls, remembers the last prompt, and replies with a canned result.
    struct SpyLlm {
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
        reply: Result<String, String>,
    }

    impl SpyLlm {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
                reply: Ok(text.to_string()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
                reply: Err(message.to_string()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionClient for SpyLlm {
        async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(request.prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(LlmError::Api {
                    status: 401,
                    message: message.clone(),
                }),
            }
        }
    }

    fn upload() -> ResumeUpload {
        ResumeUpload {
            path: PathBuf::from("uploads/resume.pdf"),
            file_name: "resume.pdf".to_string(),
        }
    }

    fn backend(extractor: impl TextExtractor + 'static, llm: Arc<SpyLlm>) -> DirectLlmBackend {
        DirectLlmBackend::new(Arc::new(extractor), llm, "gpt-4o-mini")
    }

    #[tokio::test]
    async fn test_empty_jd_is_rejected_without_llm_call() {
        let llm = SpyLlm::replying("# Jane Doe");
        let backend = backend(FixedText(RESUME), llm.clone());

        let outcome = optimize(&backend, Some(&upload()), "").await;

        assert_eq!(outcome.status_message, MISSING_INPUT_MESSAGE);
        assert!(outcome.display_text.is_none());
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_whitespace_jd_is_rejected_without_llm_call() {
        let llm = SpyLlm::replying("# Jane Doe");
        let backend = backend(FixedText(RESUME), llm.clone());

        let outcome = optimize(&backend, Some(&upload()), " \n\t ").await;

        assert_eq!(outcome.status_message, MISSING_INPUT_MESSAGE);
        assert!(!outcome.is_success());
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_upload_is_rejected_without_llm_call() {
        let llm = SpyLlm::replying("# Jane Doe");
        let backend = backend(FixedText(RESUME), llm.clone());

        let outcome = optimize(&backend, None, JD).await;

        assert_eq!(outcome.status_message, MISSING_INPUT_MESSAGE);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_llm_failure_becomes_status_message() {
        let llm = SpyLlm::failing("Incorrect API key provided");
        let backend = backend(FixedText(RESUME), llm.clone());

        let outcome = optimize(&backend, Some(&upload()), JD).await;

        assert!(outcome.display_text.is_none());
        assert!(outcome.pdf.is_none());
        assert!(outcome
            .status_message
            .contains("Incorrect API key provided"));
        assert!(outcome
            .status_message
            .starts_with("Failed to generate resume from the AI"));
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_extraction_failure_skips_llm() {
        let llm = SpyLlm::replying("# Jane Doe");
        let backend = backend(FailingExtractor, llm.clone());

        let outcome = optimize(&backend, Some(&upload()), JD).await;

        assert!(outcome.display_text.is_none());
        assert!(outcome.status_message.contains("no extractable text"));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_returns_markdown_unaltered() {
        let markdown = "# Jane Doe\n...";
        let llm = SpyLlm::replying(markdown);
        let backend = backend(FixedText(RESUME), llm.clone());

        let outcome = optimize(&backend, Some(&upload()), JD).await;

        assert_eq!(outcome.display_text.as_deref(), Some(markdown));
        assert_eq!(outcome.status_message, SUCCESS_MESSAGE);
        assert_eq!(llm.calls(), 1);

        let prompt = llm.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains(RESUME));
        assert!(prompt.contains(JD));
    }

    #[test]
    fn test_validate_inputs() {
        assert_eq!(validate_inputs(Some(1), "Rust engineer").unwrap(), 1);
        assert!(validate_inputs(None::<u8>, "Rust engineer").is_err());
        assert!(validate_inputs(Some(1), "   ").is_err());
    }
}
