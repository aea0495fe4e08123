//! OpenRouter completion backend
//!
//! Implements conjure-core's `CompletionClient` trait against OpenRouter's
//! OpenAI-compatible chat-completions API. Free-tier models are enough for
//! development and testing.
//!
//! # Usage
//!
//! ```text
//! let client = OpenRouterClient::new(api_key);
//! let synthesizer = Synthesizer::with_config(Arc::new(client), config);
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms, missing_debug_implementations)]

use async_trait::async_trait;
use conjure_core::{CompletionClient, TransportError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// OpenRouter API base URL
const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// System prompt sent with every synthesis request
const SYSTEM_PROMPT: &str = "You are a code synthesis backend. You receive a function \
     specification and respond with an implementation in the requested expression \
     language. Return ONLY the code, no explanations.";

/// OpenRouter API request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

/// Chat message
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenRouter API response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<UsageInfo>,
}

/// Chat choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Token usage info
#[derive(Debug, Deserialize)]
struct UsageInfo {
    total_tokens: Option<u32>,
}

/// OpenRouter completion client
///
/// The model is not fixed at construction: conjure-core passes the
/// configured model id with every request, so one client serves any
/// number of synthesizers.
pub struct OpenRouterClient {
    /// API key for OpenRouter
    api_key: String,

    /// HTTP client
    http_client: reqwest::Client,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    temperature: f64,

    /// Max tokens per response
    max_tokens: u32,
}

impl OpenRouterClient {
    /// Create a new OpenRouter client
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            http_client: reqwest::Client::new(),
            temperature: 0.3, // Low temperature for code generation
            max_tokens: 2048,
        }
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Send one chat completion request to OpenRouter
    async fn request_completion(
        &self,
        prompt: &str,
        model: &str,
    ) -> Result<String, TransportError> {
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        };

        let response = self
            .http_client
            .post(OPENROUTER_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TransportError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;

        if let Some(usage) = &completion.usage {
            debug!(model, tokens = ?usage.total_tokens, "completion received");
        }

        let content = completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or(TransportError::EmptyCompletion)?;

        if content.trim().is_empty() {
            return Err(TransportError::EmptyCompletion);
        }

        Ok(content)
    }
}

impl std::fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, TransportError> {
        self.request_completion(prompt, model).await
    }
}
