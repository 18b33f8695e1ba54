use serde::{Deserialize, Serialize};

use crate::services::conversation::Turn;

// ===== REQUEST MODELS =====

#[derive(Debug, Deserialize)]
pub struct ChatbotQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct UserParams {
    #[serde(default)]
    pub user_id: String,
}

// ===== RESPONSE MODELS =====

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub user_id: String,
    pub turns: Vec<Turn>,
}
