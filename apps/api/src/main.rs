mod ats;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod optimizer;
mod render;
mod routes;
mod state;
mod uploads;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::PdfTextExtractor;
use crate::llm_client::{CompletionClient, LlmClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Optimizer v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client (optional for the remote backend)
    let llm: Option<Arc<dyn CompletionClient>> = match &config.openai_api_key {
        Some(api_key) => {
            let client = LlmClient::new(
                api_key.clone(),
                &config.openai_base_url,
                Duration::from_secs(config.llm_timeout_secs),
                config.llm_max_retries,
            )
            .context("Failed to build LLM client")?;
            info!(
                "LLM client initialized (model: {}, endpoint: {})",
                config.model, config.openai_base_url
            );
            Some(Arc::new(client))
        }
        None => None,
    };

    let state = AppState::new(config.clone(), llm, Arc::new(PdfTextExtractor))?;
    info!("Optimizer backend: {}", state.backend.name());

    state.uploads.ensure_dirs().await?;
    info!("Uploads directory: {}", config.upload_dir.display());

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
