//! Axum route handlers for ATS scoring.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ats::report::AtsReport;
use crate::ats::scoring;
use crate::errors::AppError;
use crate::llm_client::CompletionClient;
use crate::optimizer::handlers::save_form_upload;
use crate::optimizer::orchestrator::validate_inputs;
use crate::state::AppState;

pub const SCORE_SUCCESS_MESSAGE: &str = "ATS scan complete.";

#[derive(Debug, Deserialize)]
pub struct ScoreTextRequest {
    pub resume_text: String,
    pub jd_text: String,
}

/// `raw` is the model's text as received. `report` is set only when that text
/// matches the report schema; otherwise `status_message` says why.
#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub raw: Option<String>,
    pub report: Option<AtsReport>,
    pub status_message: String,
}

impl ScoreResponse {
    fn failed(error: &AppError) -> Self {
        Self {
            raw: None,
            report: None,
            status_message: error.status_message(),
        }
    }
}

/// POST /api/v1/score
///
/// Multipart `file` + `jd_text`. Like `/api/v1/optimize`, always answers 200.
pub async fn handle_score(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Json<ScoreResponse> {
    let llm = match scoring_llm(&state) {
        Ok(llm) => llm,
        Err(e) => return Json(ScoreResponse::failed(&e)),
    };

    let (upload, jd_text) = match save_form_upload(&state, multipart).await {
        Ok(saved) => saved,
        Err(e) => return Json(ScoreResponse::failed(&e)),
    };

    let resume_text = match state.extractor.extract(&upload.path).await {
        Ok(text) => text,
        Err(e) => return Json(ScoreResponse::failed(&e)),
    };

    Json(score_text(&state, llm.as_ref(), &resume_text, &jd_text).await)
}

/// POST /api/v1/score/text
///
/// For callers that already hold the resume text.
pub async fn handle_score_text(
    State(state): State<AppState>,
    Json(request): Json<ScoreTextRequest>,
) -> Json<ScoreResponse> {
    let resume = Some(request.resume_text.as_str()).filter(|t| !t.trim().is_empty());
    if let Err(e) = validate_inputs(resume, &request.jd_text) {
        return Json(ScoreResponse::failed(&e));
    }
    let llm = match scoring_llm(&state) {
        Ok(llm) => llm,
        Err(e) => return Json(ScoreResponse::failed(&e)),
    };

    Json(score_text(&state, llm.as_ref(), &request.resume_text, &request.jd_text).await)
}

/// Resolved before any upload is stored.
fn scoring_llm(state: &AppState) -> Result<Arc<dyn CompletionClient>, AppError> {
    state.require_llm().cloned().map_err(|_| {
        AppError::Scoring("no LLM provider is configured; set OPENAI_API_KEY".to_string())
    })
}

async fn score_text(
    state: &AppState,
    llm: &dyn CompletionClient,
    resume_text: &str,
    jd_text: &str,
) -> ScoreResponse {
    let raw = match scoring::score(llm, &state.config.model, resume_text, jd_text).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("ATS scan failed: {e}");
            return ScoreResponse::failed(&e);
        }
    };

    match AtsReport::parse(&raw) {
        Ok(report) => {
            info!("ATS match rate {}% ({:?})", report.match_rate, report.match_level);
            ScoreResponse {
                raw: Some(raw),
                report: Some(report),
                status_message: SCORE_SUCCESS_MESSAGE.to_string(),
            }
        }
        Err(e) => {
            warn!("ATS report rejected: {e}");
            ScoreResponse {
                raw: Some(raw),
                report: None,
                status_message: e.status_message(),
            }
        }
    }
}
