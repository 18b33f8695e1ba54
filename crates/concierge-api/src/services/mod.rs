pub mod assistant;
pub mod conversation;
pub mod llm_service;

pub use assistant::{AssistantKind, AssistantRegistry};
pub use conversation::{ConversationManager, ConversationStore};
pub use llm_service::{CompletionProvider, LlmService};
