//! OpenAI-compatible chat-completions client.
//!
//! Works against the OpenAI API and any endpoint speaking the same wire
//! format (OpenRouter, Ollama, vLLM). Only available with the `openai`
//! feature.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{ModelError, Result};
use crate::llm::Llm;
use crate::message::{Message, Role};

/// The default OpenAI chat-completions endpoint.
const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// An [`Llm`] backed by an OpenAI-compatible chat-completions API.
///
/// # Configuration
///
/// - `model` – the model identifier passed through to the API.
/// - `api_key` – from the constructor or the `OPENAI_API_KEY` environment
///   variable via [`from_env`](OpenAIChatClient::from_env).
/// - `base_url` – override with [`compatible`](OpenAIChatClient::compatible)
///   to talk to OpenRouter or a local server.
///
/// # Example
///
/// ```rust,ignore
/// use lectern_model::OpenAIChatClient;
///
/// let llm = OpenAIChatClient::compatible(
///     api_key,
///     "https://openrouter.ai/api/v1/chat/completions",
///     "openai/gpt-4o-mini",
/// )?;
/// ```
pub struct OpenAIChatClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
    temperature: Option<f32>,
}

impl OpenAIChatClient {
    /// Create a new client against the standard OpenAI endpoint.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ModelError::Config("API key must not be empty".into()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            url: OPENAI_CHAT_URL.into(),
            temperature: None,
        })
    }

    /// Create a client using the `OPENAI_API_KEY` environment variable.
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ModelError::Config("OPENAI_API_KEY environment variable not set".into())
        })?;
        Self::new(api_key, model)
    }

    /// Create a client for an OpenAI-compatible API at a custom URL.
    pub fn compatible(
        api_key: impl Into<String>,
        url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let mut client = Self::new(api_key, model)?;
        client.url = url.into();
        Ok(client)
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: WireResponseMessage,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

// ── Llm implementation ─────────────────────────────────────────────

#[async_trait]
impl Llm for OpenAIChatClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        debug!(model = %self.model, message_count = messages.len(), "chat completion request");

        let request_body = ChatRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| WireMessage { role: role_str(m.role), content: &m.content })
                .collect(),
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "chat request failed");
                ModelError::Provider {
                    provider: self.model.clone(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(model = %self.model, %status, "chat API error");
            return Err(ModelError::Provider {
                provider: self.model.clone(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            ModelError::InvalidResponse {
                provider: self.model.clone(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ModelError::InvalidResponse {
                provider: self.model.clone(),
                message: "response contained no choices".into(),
            })
    }
}
