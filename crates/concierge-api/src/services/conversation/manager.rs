use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::services::assistant::{AssistantKind, AssistantRegistry};
use crate::services::llm_service::CompletionProvider;
use crate::utils::error::ApiError;
use crate::utils::limiters::Limiters;

use super::store::ConversationStore;
use super::token_counter::TokenCounter;
use super::trimmer::HistoryTrimmer;
use super::types::{StoreStats, Turn};

/// Routes one user message through an assistant and records the exchange
pub struct ConversationManager {
    store: ConversationStore,
    trimmer: HistoryTrimmer,
    assistants: AssistantRegistry,
    llm_provider: Arc<dyn CompletionProvider>,
    limiters: Limiters,
}

impl ConversationManager {
    pub fn new(
        store: ConversationStore,
        trimmer: HistoryTrimmer,
        assistants: AssistantRegistry,
        llm_provider: Arc<dyn CompletionProvider>,
        limiters: Limiters,
    ) -> Self {
        Self {
            store,
            trimmer,
            assistants,
            llm_provider,
            limiters,
        }
    }

    /// Answer `query` from `user_id` with the given assistant.
    ///
    /// The exchange is stored only after the completion succeeds, so a failed
    /// call leaves the user's history as it was.
    pub async fn handle_message(
        &self,
        assistant: AssistantKind,
        user_id: &str,
        query: &str,
        request_id: &str,
    ) -> Result<String, ApiError> {
        let start_time = Instant::now();

        if user_id.trim().is_empty() {
            return Err(ApiError::BadRequest("No user_id provided.".to_string()));
        }
        if query.trim().is_empty() {
            return Err(ApiError::BadRequest("No query provided.".to_string()));
        }

        let mut history = self.store.get(user_id);
        let history_len = history.len();
        history.push(Turn::user(query));
        let window = self.trimmer.apply(&history);

        debug!(
            "[{}] {} window for user {}: history={}, window={} (~{} tokens)",
            request_id,
            assistant,
            user_id,
            history_len,
            window.len(),
            TokenCounter::count_turns(&window)
        );

        let (_permit, waited) = self
            .limiters
            .acquire_llm()
            .await
            .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?;
        if waited.as_millis() > 500 {
            warn!("[{}] Waited {:?} for completion slot", request_id, waited);
        }

        let reply = self
            .llm_provider
            .complete(self.assistants.system_prompt(assistant), &window)
            .await
            .map_err(|e| ApiError::LlmError(format!("{:#}", e)))?;

        self.store.append_pair(user_id, query, reply.as_str())?;

        info!(
            "[{}] {} replied to user {} in {}ms",
            request_id,
            assistant,
            user_id,
            start_time.elapsed().as_millis()
        );

        Ok(reply)
    }

    /// Stored turns for a user, oldest first
    pub fn history(&self, user_id: &str) -> Vec<Turn> {
        self.store.get(user_id)
    }

    pub fn store_stats(&self) -> StoreStats {
        self.store.stats()
    }
}
