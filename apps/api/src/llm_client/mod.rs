//! Chat-completions client for an OpenAI-compatible provider.
//!
//! Every language-model call in the service goes through `CompletionClient`.
//! One `LlmClient` is built at startup and shared through `AppState`, so the
//! connection pool is reused across requests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Gave up after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A single-turn completion request: one system instruction, one user message.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub model: &'a str,
    pub temperature: f32,
}

/// Anything that can turn a prompt into the text of one completion.
///
/// Carried in `AppState` as `Arc<dyn CompletionClient>` so orchestrators can be
/// exercised against a stub.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice, if the provider returned any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Chat-completions client with an optional bounded retry policy.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: String,
    max_retries: u32,
}

impl LlmClient {
    pub fn new(
        api_key: String,
        base_url: &str,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            max_retries,
        })
    }

    /// Makes a raw call to the provider, returning the full response object.
    /// Retries on 429, 5xx, and transport errors when `max_retries > 0`.
    pub async fn call(&self, request: CompletionRequest<'_>) -> Result<ChatResponse, LlmError> {
        let body = ChatRequest {
            model: request.model,
            temperature: request.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
        };

        let attempts = self.max_retries.saturating_add(1);
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = backoff_delay(attempt);
                warn!(
                    "LLM call attempt {}/{} failed, retrying after {}ms...",
                    attempt,
                    attempts,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let text = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}", status);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: provider_message(text),
                });
                continue;
            }

            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: provider_message(text),
                });
            }

            let chat: ChatResponse = serde_json::from_slice(&response.bytes().await?)?;

            if let Some(usage) = &chat.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return Ok(chat);
        }

        Err(last_error.unwrap_or(LlmError::RetriesExhausted { attempts }))
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError> {
        let response = self.call(request).await?;
        response
            .text()
            .map(str::to_owned)
            .ok_or(LlmError::EmptyContent)
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(1000 * (1 << (attempt - 1).min(6)))
}

/// Pulls `error.message` out of a provider error body, falling back to the raw text.
fn provider_message(body: String) -> String {
    serde_json::from_str::<ProviderError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}
