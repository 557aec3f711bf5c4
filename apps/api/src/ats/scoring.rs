//! ATS scoring: asks the model for a Jobscan-style JSON report.
//!
//! `score` returns the model's text exactly as received. Turning it into an
//! `AtsReport` is the caller's job (see `ats::report`), because the model is
//! instructed, not guaranteed, to answer with valid JSON.

use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::SCORING_SYSTEM;
use crate::llm_client::{CompletionClient, CompletionRequest};
use crate::optimizer::prompts::build_scoring_prompt;

/// Sampling temperature for the scoring call.
pub const SCORING_TEMPERATURE: f32 = 0.7;

pub async fn score(
    llm: &dyn CompletionClient,
    model: &str,
    resume_text: &str,
    jd_text: &str,
) -> Result<String, AppError> {
    let prompt = build_scoring_prompt(resume_text, jd_text);

    let raw = llm
        .complete(CompletionRequest {
            system: SCORING_SYSTEM,
            prompt: &prompt,
            model,
            temperature: SCORING_TEMPERATURE,
        })
        .await
        .map_err(|e| AppError::Scoring(e.to_string()))?;

    info!("ATS scan returned {} characters", raw.len());
    Ok(raw)
}
