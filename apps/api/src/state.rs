use std::sync::Arc;
use std::time::Duration;

use crate::config::{BackendKind, Config};
use crate::errors::AppError;
use crate::extraction::TextExtractor;
use crate::llm_client::CompletionClient;
use crate::optimizer::backend::{DirectLlmBackend, RemoteApiBackend, ResumeBackend};
use crate::uploads::UploadStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Backend behind `/api/v1/optimize`, selected by `OPTIMIZER_BACKEND`.
    pub backend: Arc<dyn ResumeBackend>,
    /// Local pipeline, present whenever an LLM provider is configured.
    /// Serves `/get-optimised-resume` even when `backend` is remote.
    pub direct: Option<Arc<DirectLlmBackend>>,
    pub llm: Option<Arc<dyn CompletionClient>>,
    pub extractor: Arc<dyn TextExtractor>,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(
        config: Config,
        llm: Option<Arc<dyn CompletionClient>>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Result<Self, AppError> {
        let direct = llm.as_ref().map(|llm| {
            Arc::new(DirectLlmBackend::new(
                extractor.clone(),
                llm.clone(),
                config.model.clone(),
            ))
        });

        let backend: Arc<dyn ResumeBackend> = match config.backend {
            BackendKind::Direct => match &direct {
                Some(direct) => direct.clone(),
                None => return Err(no_llm_configured()),
            },
            BackendKind::Remote => {
                let url = config.remote_api_url.as_deref().ok_or_else(|| {
                    AppError::Internal(anyhow::anyhow!("REMOTE_API_URL is not set"))
                })?;
                Arc::new(RemoteApiBackend::new(
                    url,
                    Duration::from_secs(config.remote_timeout_secs),
                )?)
            }
        };

        let uploads = UploadStore::new(config.upload_dir.clone(), config.max_upload_bytes);

        Ok(Self {
            config,
            backend,
            direct,
            llm,
            extractor,
            uploads,
        })
    }

    pub fn require_llm(&self) -> Result<&Arc<dyn CompletionClient>, AppError> {
        self.llm.as_ref().ok_or_else(no_llm_configured)
    }

    pub fn require_direct(&self) -> Result<&Arc<DirectLlmBackend>, AppError> {
        self.direct.as_ref().ok_or_else(no_llm_configured)
    }
}

fn no_llm_configured() -> AppError {
    AppError::Generation("no LLM provider is configured; set OPENAI_API_KEY".to_string())
}

#[cfg(test)]
mod tests {
    use crate::extraction::PdfTextExtractor;

    use super::*;

    fn remote_config() -> Config {
        Config::from_lookup(|key| match key {
            "OPTIMIZER_BACKEND" => Some("remote".to_string()),
            "REMOTE_API_URL" => Some("http://localhost:8000".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_remote_backend_without_llm() {
        let state = AppState::new(remote_config(), None, Arc::new(PdfTextExtractor)).unwrap();

        assert_eq!(state.backend.name(), "remote");
        assert!(state.direct.is_none());
        assert!(matches!(state.require_llm(), Err(AppError::Generation(_))));
        assert!(state.require_direct().is_err());
    }

    #[test]
    fn test_direct_backend_needs_llm() {
        let mut config = remote_config();
        config.backend = BackendKind::Direct;

        let result = AppState::new(config, None, Arc::new(PdfTextExtractor));
        assert!(result.is_err());
    }
}
