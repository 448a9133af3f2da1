//! Completion provider for the reasoning loop.
//!
//! Speaks the OpenAI-compatible chat completions API; Groq hosting
//! llama-3.3 is the default backend. Generation runs at temperature 0 and
//! always halts at the observation markers, so the model can never write
//! its own tool results.

use crate::{AgentError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_GROQ_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Stop markers cutting generation before any hallucinated observation
pub const OBSERVATION_STOPS: &[&str] = &["\nObservation:", "Observation:"];

fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// A text-completion backend the reasoning loop can drive.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete `prompt`, halting generation at the first stop marker
    async fn complete(&self, prompt: &str, stop: &[String]) -> Result<String>;
}

/// OpenAI-compatible chat completions client, configured for Groq
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GroqClient {
    /// Create a client with the given API key; URL and model come from
    /// GROQ_API_URL / GROQ_MODEL or their defaults
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: env_or_default("GROQ_API_URL", DEFAULT_GROQ_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.into(),
            model: env_or_default("GROQ_MODEL", DEFAULT_GROQ_MODEL),
        }
    }

    /// Builder: override the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder: override the endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionProvider for GroqClient {
    async fn complete(&self, prompt: &str, stop: &[String]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            // Tool selection must be reproducible
            temperature: 0.0,
            stop: stop.to_vec(),
        };

        let timeout_secs = std::env::var("GROQ_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .timeout(Duration::from_secs(timeout_secs))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Completion(format!("{}: {}", status, body)));
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AgentError::Completion("completion response had no choices".into()))
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}
