use serde::{Deserialize, Serialize};
use std::fmt;

use super::token_counter::TokenCounter;

/// Speaker of a turn. Serialized lowercase, matching chat-completion wire roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a conversation.
///
/// Fields are private so a turn cannot be edited after it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Estimated token cost of this turn, including role framing
    pub fn estimate_tokens(&self) -> usize {
        TokenCounter::count_turn(self)
    }
}

/// Size bound applied by the trimmer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimBudget {
    /// Keep at most this many of the most recent turns
    MaxTurns(usize),
    /// Keep as many recent turns as fit this estimated token count
    MaxTokens(usize),
}

/// Store statistics for monitoring
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub conversations: usize,
    pub total_turns: usize,
    pub memory_usage_mb: u64,
    pub memory_total_mb: u64,
    pub memory_usage_percent: f64,
}
