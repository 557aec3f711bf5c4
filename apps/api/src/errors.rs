use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message shown when the form is submitted without a resume or job description.
pub const MISSING_INPUT_MESSAGE: &str = "Please upload a resume and provide a job description.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Scoring error: {0}")]
    Scoring(String),

    #[error("Remote API error (status {status}): {body}")]
    RemoteApi { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// User-facing status line for the presentation layer.
    ///
    /// The orchestrator never lets an error escape into the UI; it renders
    /// it through this method instead.
    pub fn status_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Extraction(msg) => format!("Failed to read the uploaded resume: {msg}"),
            AppError::Generation(msg) => format!("Failed to generate resume from the AI: {msg}"),
            AppError::Scoring(msg) => format!("Failed to score resume with the AI: {msg}"),
            AppError::RemoteApi { body, .. } => format!("API Error: {body}"),
            AppError::MalformedResponse(msg) => {
                format!("The AI returned a response that does not match the expected format: {msg}")
            }
            AppError::Render(msg) => format!("Failed to export resume: {msg}"),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Internal(e) => format!("An internal error occurred: {e}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Extraction(_) => (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_ERROR"),
            AppError::Generation(msg) => {
                tracing::error!("Generation error: {msg}");
                (StatusCode::BAD_GATEWAY, "GENERATION_ERROR")
            }
            AppError::Scoring(msg) => {
                tracing::error!("Scoring error: {msg}");
                (StatusCode::BAD_GATEWAY, "SCORING_ERROR")
            }
            AppError::RemoteApi { status, .. } => {
                tracing::error!("Remote API returned status {status}");
                (StatusCode::BAD_GATEWAY, "REMOTE_API_ERROR")
            }
            AppError::MalformedResponse(msg) => {
                tracing::error!("Malformed LLM response: {msg}");
                (StatusCode::BAD_GATEWAY, "MALFORMED_RESPONSE")
            }
            AppError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "RENDER_ERROR")
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let message = match &self {
            AppError::Internal(_) => "An internal server error occurred".to_string(),
            other => other.status_message(),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
