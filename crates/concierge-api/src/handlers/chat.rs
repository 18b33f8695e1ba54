use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::models::chat::{ChatResponse, ChatbotQuery, ConversationResponse, UserParams};
use crate::services::{AssistantKind, ConversationManager};
use crate::utils::error::ApiError;

/// `POST /{assistant}/chat?user_id=...`
pub async fn chat_handler(
    State(manager): State<Arc<ConversationManager>>,
    Path(assistant): Path<String>,
    Query(params): Query<UserParams>,
    Json(request): Json<ChatbotQuery>,
) -> Result<Json<ChatResponse>, ApiError> {
    let assistant = AssistantKind::from_slug(&assistant)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown assistant '{}'", assistant)))?;

    let request_id = uuid::Uuid::new_v4().to_string();

    info!(
        "[{}] Chat request: assistant={}, user={}, query_len={}",
        request_id,
        assistant,
        params.user_id,
        request.query.len()
    );

    let response = manager
        .handle_message(assistant, &params.user_id, &request.query, &request_id)
        .await?;

    Ok(Json(ChatResponse { response }))
}

/// `GET /history?user_id=...`
pub async fn history_handler(
    State(manager): State<Arc<ConversationManager>>,
    Query(params): Query<UserParams>,
) -> Result<Json<ConversationResponse>, ApiError> {
    if params.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("No user_id provided.".to_string()));
    }

    let turns = manager.history(&params.user_id);
    Ok(Json(ConversationResponse {
        user_id: params.user_id,
        turns,
    }))
}
