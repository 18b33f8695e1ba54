use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.settings.server.body_limit_bytes;

    // Public routes
    let public_routes = Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check));

    // Assistant chat routes, e.g. /plan-my-trip/chat. History stays a single
    // segment so no static prefix shadows an assistant slug.
    let chat_routes = Router::new()
        .route("/{assistant}/chat", post(handlers::chat::chat_handler))
        .route("/history", get(handlers::chat::history_handler));

    Router::new()
        .merge(public_routes)
        .merge(chat_routes)
        .with_state(state)
        // CORS
        .layer(CorsLayer::permissive())
        // Tracing
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .layer(DefaultBodyLimit::max(body_limit))
}
