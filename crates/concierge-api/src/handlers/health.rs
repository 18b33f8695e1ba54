use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::services::conversation::StoreStats;
use crate::services::ConversationManager;

#[derive(Serialize)]
pub struct WelcomeResponse {
    msg: String,
    status: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        msg: "Welcome to the Bali concierge chatbot".to_string(),
        status: "running".to_string(),
    })
}

pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Store statistics; the in-memory store is always ready once constructed
pub async fn readiness_check(
    State(manager): State<Arc<ConversationManager>>,
) -> (StatusCode, Json<StoreStats>) {
    (StatusCode::OK, Json(manager.store_stats()))
}
