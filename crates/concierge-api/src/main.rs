use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use concierge_api::config::Settings;
use concierge_api::services::conversation::HistoryTrimmer;
use concierge_api::services::{
    AssistantRegistry, CompletionProvider, ConversationManager, ConversationStore, LlmService,
};
use concierge_api::utils::Limiters;
use concierge_api::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,concierge_api=debug".to_string()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .init();

    info!("🚀 Starting concierge API server...");

    // Load configuration
    let settings = Arc::new(Settings::load()?);
    info!("✅ Configuration loaded");

    // Initialize services
    let llm_service = Arc::new(LlmService::new(settings.llm.clone())?);

    // Non-fatal: the server still starts if the completion API is unreachable
    let probe = llm_service.clone();
    tokio::spawn(async move {
        match probe.check_connectivity().await {
            Ok(()) => info!("✅ Completion API connection verified"),
            Err(e) => warn!("⚠️ Completion API check failed (non-fatal): {:#}", e),
        }
    });

    let store = ConversationStore::new(settings.memory.max_memory_percent);
    let trimmer = HistoryTrimmer::new(settings.memory.max_turns, settings.memory.max_tokens);
    let assistants = AssistantRegistry::new(&settings.assistants.prompts);
    let limiters = Limiters::new(&settings.limits);

    let llm_provider: Arc<dyn CompletionProvider> = llm_service;
    let conversation_manager = Arc::new(ConversationManager::new(
        store,
        trimmer,
        assistants,
        llm_provider,
        limiters,
    ));

    let app = build_router(AppState {
        conversation_manager,
        settings: settings.clone(),
    });

    // Server address
    let addr = SocketAddr::from((
        settings
            .server
            .host
            .parse::<std::net::IpAddr>()
            .with_context(|| format!("Invalid server.host '{}'", settings.server.host))?,
        settings.server.port,
    ));

    info!("🎯 Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
