//! OpenAI chat-completions based text generator.
//!
//! Binds [`TextGenerator`](crate::generation::TextGenerator) to the OpenAI
//! chat completions API, or to any server exposing the same wire format via
//! [`OpenAiGenerator::with_base_url`]. Requires an API key and network
//! access.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{QuiverError, Result};
use crate::generation::{GenerationRequest, TextGenerator};

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Default API endpoint prefix.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TEMPERATURE: f32 = 0.0;

/// Request structure for the chat completions API.
#[derive(Debug, Serialize)]
struct ChatRequest {
    /// Model identifier.
    model: String,
    /// Conversation messages (system prompt first when present).
    messages: Vec<ChatMessage>,
    /// Token budget for the completion.
    max_tokens: u32,
    /// Sampling temperature.
    temperature: f32,
}

/// One chat message.
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Response structure from the chat completions API.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// OpenAI-backed text generator.
///
/// # Examples
///
/// ```no_run
/// use quiver::generation::openai::OpenAiGenerator;
///
/// # fn main() -> quiver::error::Result<()> {
/// let generator = OpenAiGenerator::new(
///     std::env::var("OPENAI_API_KEY").unwrap(),
///     "gpt-4.1-mini",
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OpenAiGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiGenerator {
    /// Create a generator for the given API key and model.
    pub fn new<K: Into<String>, M: Into<String>>(api_key: K, model: M) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(QuiverError::invalid_argument("API key must not be empty"));
        }
        Ok(Self {
            client: Client::new(),
            api_key,
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Create a generator using [`DEFAULT_MODEL`].
    pub fn with_default_model<K: Into<String>>(api_key: K) -> Result<Self> {
        Self::new(api_key, DEFAULT_MODEL)
    }

    /// Point the generator at an OpenAI-compatible server.
    pub fn with_base_url<U: Into<String>>(mut self, base_url: U) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The model identifier this generator sends.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt.clone(),
        });

        let body = ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| QuiverError::generation(format!("request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(QuiverError::generation(format!(
                "API returned {status}: {detail}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| QuiverError::generation(format!("malformed response: {err}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| QuiverError::generation("response contained no choices"))?;

        Ok(content)
    }

    fn name(&self) -> &str {
        "openai-chat"
    }
}
