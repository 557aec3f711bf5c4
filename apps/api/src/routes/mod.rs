pub mod health;
pub mod ui;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::ats::handlers as ats;
use crate::optimizer::handlers as optimizer;
use crate::state::AppState;

/// Multipart framing on top of the file and the job description.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.uploads.max_bytes() + optimizer::MAX_JD_BYTES + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(ui::index_handler))
        .route("/health", get(health::health_handler))
        // Optimization
        .route("/api/v1/optimize", post(optimizer::handle_optimize))
        .route("/api/v1/downloads/:id", get(optimizer::handle_download))
        .route("/api/v1/render", post(optimizer::handle_render))
        .route(
            "/get-optimised-resume",
            post(optimizer::handle_get_optimised_resume),
        )
        // ATS scoring
        .route("/api/v1/score", post(ats::handle_score))
        .route("/api/v1/score/text", post(ats::handle_score_text))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
