//! Axum route handlers for the optimization and export API.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::optimizer::backend::ResumeBackend;
use crate::optimizer::orchestrator::{self, validate_inputs, OptimizeOutcome};
use crate::render::{render_html, spawn_render_pdf};
use crate::state::AppState;
use crate::uploads::ResumeUpload;

pub const DOWNLOAD_FILE_NAME: &str = "tailored_resume.pdf";
/// Size allowance for the job description, separate from the resume limit.
pub const MAX_JD_BYTES: usize = 256 * 1024;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Fields of the resume upload form. `file` is `(file name, contents)`.
#[derive(Debug, Default)]
pub struct ResumeForm {
    pub file: Option<(String, Bytes)>,
    pub jd_text: String,
}

impl ResumeForm {
    /// Reads the `file` and `jd_text` fields. Unknown fields are ignored.
    pub async fn read(mut multipart: Multipart, max_bytes: usize) -> Result<Self, AppError> {
        let mut form = ResumeForm::default();

        while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let data = field.bytes().await.map_err(invalid_form)?;
                    if data.len() > max_bytes {
                        return Err(AppError::Validation(format!(
                            "The uploaded resume exceeds the {max_bytes} byte limit."
                        )));
                    }
                    // An empty file input still submits a nameless, empty part.
                    if !(file_name.is_empty() && data.is_empty()) {
                        form.file = Some((file_name, data));
                    }
                }
                "jd_text" => {
                    let jd_text = field.text().await.map_err(invalid_form)?;
                    if jd_text.len() > MAX_JD_BYTES {
                        return Err(AppError::Validation(format!(
                            "The job description exceeds the {MAX_JD_BYTES} byte limit."
                        )));
                    }
                    form.jd_text = jd_text;
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

fn invalid_form(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::Validation(
            "The upload is too large. Resumes and job descriptions have separate size limits."
                .to_string(),
        );
    }
    AppError::Validation(format!("Invalid upload form: {e}"))
}

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub display_text: Option<String>,
    pub status_message: String,
    pub download_url: Option<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct OptimiseQuery {
    #[serde(default)]
    pub jd_string: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    #[default]
    Pdf,
    Html,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub markdown: String,
    #[serde(default)]
    pub format: RenderFormat,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/optimize
///
/// Multipart `file` + `jd_text`. Always answers 200: failures are reported
/// through `status_message` with `display_text` left empty.
pub async fn handle_optimize(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Json<OptimizeResponse> {
    let outcome = match save_form_upload(&state, multipart).await {
        Ok((upload, jd_text)) => {
            orchestrator::optimize(state.backend.as_ref(), Some(&upload), &jd_text).await
        }
        Err(e) => OptimizeOutcome::failed(&e),
    };
    if outcome.is_success() {
        info!("Optimization succeeded via the {} backend", state.backend.name());
    }

    let OptimizeOutcome {
        display_text,
        mut status_message,
        mut pdf,
    } = outcome;

    if pdf.is_none() && state.config.render_pdf {
        if let Some(markdown) = &display_text {
            match spawn_render_pdf(markdown.clone()).await {
                Ok(bytes) => pdf = Some(Bytes::from(bytes)),
                Err(e) => {
                    warn!("PDF export failed: {e}");
                    append_note(&mut status_message, &e);
                }
            }
        }
    }

    let mut download_url = None;
    if let Some(pdf) = pdf {
        match state.uploads.save_rendered(&pdf).await {
            Ok(id) => download_url = Some(format!("/api/v1/downloads/{id}")),
            Err(e) => {
                warn!("Could not store PDF for download: {e}");
                append_note(&mut status_message, &e);
            }
        }
    }

    Json(OptimizeResponse {
        display_text,
        status_message,
        download_url,
        generated_at: Utc::now(),
    })
}

/// GET /api/v1/downloads/:id
pub async fn handle_download(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let pdf = state.uploads.load_rendered(id).await?;
    Ok(pdf_attachment(pdf))
}

/// POST /get-optimised-resume?jd_string=…
///
/// REST form of the direct pipeline: multipart `file` in, rendered PDF out.
/// One deployment can act as the remote backend of another.
pub async fn handle_get_optimised_resume(
    State(state): State<AppState>,
    Query(query): Query<OptimiseQuery>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let direct = state.require_direct()?.clone();

    let form = ResumeForm::read(multipart, state.uploads.max_bytes()).await?;
    let (file_name, data) = validate_inputs(form.file, &query.jd_string)?;
    let upload = state.uploads.save_resume(&file_name, &data).await?;

    let resume = direct.optimize(&upload, &query.jd_string).await?;
    let markdown = resume
        .markdown
        .ok_or_else(|| AppError::Generation("the model returned no resume".to_string()))?;

    let pdf = spawn_render_pdf(markdown).await?;
    info!("Served optimized PDF for '{}' ({} bytes)", file_name, pdf.len());

    Ok(pdf_attachment(pdf))
}

/// POST /api/v1/render
///
/// Renders Markdown with the resume stylesheet, as PDF (default) or HTML.
pub async fn handle_render(Json(request): Json<RenderRequest>) -> Result<Response, AppError> {
    if request.markdown.trim().is_empty() {
        return Err(AppError::Validation("markdown cannot be empty".to_string()));
    }

    match request.format {
        RenderFormat::Html => Ok(Html(render_html(&request.markdown)).into_response()),
        RenderFormat::Pdf => Ok(pdf_attachment(spawn_render_pdf(request.markdown).await?)),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Reads the form, rejects missing input before any I/O, then stores the PDF.
pub(crate) async fn save_form_upload(
    state: &AppState,
    multipart: Multipart,
) -> Result<(ResumeUpload, String), AppError> {
    let form = ResumeForm::read(multipart, state.uploads.max_bytes()).await?;
    let (file_name, data) = validate_inputs(form.file, &form.jd_text)?;
    let upload = state.uploads.save_resume(&file_name, &data).await?;
    Ok((upload, form.jd_text))
}

fn pdf_attachment(pdf: impl Into<Bytes>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\""),
            ),
        ],
        pdf.into(),
    )
        .into_response()
}

fn append_note(status_message: &mut String, error: &AppError) {
    status_message.push(' ');
    status_message.push_str(&error.status_message());
}
