//! Conversation memory
//!
//! - Per-user turn store (DashMap, per-key serialized appends)
//! - Pure history trimmer (turn count / token budget)
//! - Manager tying the store, trimmer and completion provider together

pub mod manager;
mod store;
mod token_counter;
pub mod trimmer;
pub mod types;

pub use manager::ConversationManager;
pub use store::{ConversationStore, StoreError};
pub use token_counter::TokenCounter;
pub use trimmer::{trim, HistoryTrimmer};
pub use types::{Role, StoreStats, TrimBudget, Turn};
