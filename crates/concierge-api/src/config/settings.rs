use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub memory: MemoryConfig,
    pub limits: LimitsConfig,
    pub assistants: AssistantsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_tokens: usize,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-4o".to_string(),
            timeout_seconds: 60,
            max_tokens: 600,
            temperature: 0.5,
        }
    }
}

/// Conversation window and store guard
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct MemoryConfig {
    /// Most recent turns sent to the completion API (10 = 5 exchanges)
    pub max_turns: usize,
    /// Estimated token budget for the history window
    pub max_tokens: usize,
    /// New conversations are refused at or above this system memory usage
    pub max_memory_percent: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_turns: 10,
            max_tokens: 3_000,
            max_memory_percent: 90.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LimitsConfig {
    pub llm_concurrency: usize,
    pub acquire_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            llm_concurrency: 32,
            acquire_timeout_ms: 10_000,
        }
    }
}

/// System prompt overrides keyed by assistant slug
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AssistantsConfig {
    pub prompts: HashMap<String, String>,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/settings").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let mut settings: Settings = config
            .try_deserialize()
            .context("Failed to parse configuration")?;

        settings.apply_legacy_env(|key| std::env::var(key).ok());
        settings.warn_missing();

        Ok(settings)
    }

    /// Plain variables used by existing deployments (OPENAI_API_KEY, PORT, ...)
    fn apply_legacy_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.llm.api_key.is_empty() {
            if let Some(key) = lookup("OPENAI_API_KEY") {
                self.llm.api_key = key;
            }
        }

        if let Some(model) = lookup("OPENAI_MODEL_NAME").filter(|m| !m.is_empty()) {
            self.llm.model = model;
        }

        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid PORT value '{}'", port),
            }
        }
    }

    /// The service starts without these, but chat requests will fail
    fn warn_missing(&self) {
        if self.llm.api_key.is_empty() {
            warn!("Missing completion API key (APP_LLM__API_KEY or OPENAI_API_KEY)");
        }
        if self.llm.base_url.is_empty() {
            warn!("Missing completion API base URL (APP_LLM__BASE_URL)");
        }
    }
}
