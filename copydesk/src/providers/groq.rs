//! Groq chat completions client.
//!
//! Talks to Groq's OpenAI-compatible `chat/completions` endpoint with
//! bearer auth. Defaults to a small, fast model to stay under the free-tier
//! rate limits.
//!
//! # Examples
//!
//! ```rust,ignore
//! use copydesk::providers::GroqClient;
//!
//! let client = GroqClient::from_env()?
//!     .with_model("llama-3.3-70b-versatile");
//! let reply = client.chat(&[ChatMessage::user("hello")]).await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

use super::{ChatMessage, ChatProvider};

/// Groq's OpenAI-compatible API base URL.
pub const GROQ_API_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default chat model.
pub const GROQ_DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

const DEFAULT_TEMPERATURE: f64 = 0.5;

/// Chat provider backed by the Groq API.
#[derive(Clone)]
pub struct GroqClient {
    http_client: reqwest::Client,
    base_url: Arc<str>,
    api_key: String,
    model: String,
    temperature: f64,
}

impl std::fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl GroqClient {
    /// Create a client with the given API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: GROQ_API_BASE_URL.into(),
            api_key: api_key.into(),
            model: GROQ_DEFAULT_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Build a client from `GROQ_API_KEY` and, when set, `GROQ_MODEL`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] if `GROQ_API_KEY` is not set.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("GROQ_API_KEY")
            .map_err(|_| LlmError::auth("groq", "GROQ_API_KEY is not set"))?;

        let client = Self::new(api_key);
        Ok(match std::env::var("GROQ_MODEL") {
            Ok(model) if !model.trim().is_empty() => client.with_model(model.trim()),
            _ => client,
        })
    }

    /// Use a different chat model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different OpenAI-compatible endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut url = base_url.into();
        if url.ends_with('/') {
            url.pop();
        }
        self.base_url = url.into();
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Provide a custom [`reqwest::Client`] (e.g. with proxy or timeout).
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = client;
        self
    }
}

#[async_trait]
impl ChatProvider for GroqClient {
    fn provider_name(&self) -> &str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LlmError::auth("groq", "Invalid or expired API key"));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::rate_limited("groq"));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::http_status(status.as_u16(), body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::response_format("chat completion JSON", e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                LlmError::response_format("a non-empty assistant message", "no content")
            })
    }
}

// Groq chat completion shapes (private).
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}
