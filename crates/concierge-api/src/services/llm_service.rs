use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::LlmConfig;
use crate::services::conversation::Turn;

/// Chat-completion backend consumed by the conversation manager
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a reply to `turns` (oldest first) under `system_prompt`
    async fn complete(&self, system_prompt: &str, turns: &[Turn]) -> Result<String>;
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<Turn>,
    pub max_tokens: usize,
    pub temperature: f32,
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

/// OpenAI-compatible `/v1/chat/completions` client
#[derive(Clone)]
pub struct LlmService {
    client: Client,
    config: LlmConfig,
}

impl LlmService {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// System prompt first, then the conversation window
    pub fn build_messages(system_prompt: &str, turns: &[Turn]) -> Vec<Turn> {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(Turn::system(system_prompt));
        messages.extend_from_slice(turns);
        messages
    }

    /// One-turn request used at start-up to verify credentials and reachability
    pub async fn check_connectivity(&self) -> Result<()> {
        self.complete("System check", &[]).await.map(|_| ())
    }
}

#[async_trait::async_trait]
impl CompletionProvider for LlmService {
    async fn complete(&self, system_prompt: &str, turns: &[Turn]) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: Self::build_messages(system_prompt, turns),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stream: false,
        };

        debug!(
            "Calling completion API: model={}, messages={}",
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(format!(
                "{}/v1/chat/completions",
                self.config.base_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to call completion API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Completion API error: {} - {}", status, body);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse completion response")?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("No content returned from completion API")
    }
}
