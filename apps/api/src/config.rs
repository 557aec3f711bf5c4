use std::path::PathBuf;

use anyhow::{bail, Context, Result};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
/// Upper bound for `LLM_MAX_RETRIES`.
pub const MAX_LLM_RETRIES: u32 = 10;

/// Which implementation produces the optimized resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Extract text locally and call the LLM provider directly.
    Direct,
    /// Forward the upload to a remote `/get-optimised-resume` endpoint.
    Remote,
}

impl std::str::FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(BackendKind::Direct),
            "remote" => Ok(BackendKind::Remote),
            other => bail!("OPTIMIZER_BACKEND must be 'direct' or 'remote', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if a variable required by the selected backend is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendKind,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub model: String,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
    pub remote_api_url: Option<String>,
    pub remote_timeout_secs: u64,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub render_pdf: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend: BackendKind = lookup("OPTIMIZER_BACKEND")
            .unwrap_or_else(|| "direct".to_string())
            .parse()?;

        let openai_api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());
        let remote_api_url = lookup("REMOTE_API_URL").filter(|u| !u.trim().is_empty());

        match backend {
            BackendKind::Direct if openai_api_key.is_none() => {
                bail!("Required environment variable 'OPENAI_API_KEY' is not set")
            }
            BackendKind::Remote if remote_api_url.is_none() => {
                bail!("Required environment variable 'REMOTE_API_URL' is not set")
            }
            _ => {}
        }

        let llm_max_retries = parse_or(&lookup, "LLM_MAX_RETRIES", 0)?;
        if llm_max_retries > MAX_LLM_RETRIES {
            bail!("LLM_MAX_RETRIES must be at most {MAX_LLM_RETRIES}, got {llm_max_retries}");
        }

        Ok(Config {
            backend,
            openai_api_key,
            openai_base_url: lookup("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            model: lookup("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_timeout_secs: parse_or(&lookup, "LLM_TIMEOUT_SECS", 120)?,
            llm_max_retries,
            remote_api_url,
            remote_timeout_secs: parse_or(&lookup, "REMOTE_TIMEOUT_SECS", 60)?,
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            render_pdf: parse_or(&lookup, "RENDER_PDF", false)?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
