use dashmap::DashMap;
use std::sync::Arc;
use sysinfo::System;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::types::{Role, StoreStats, Turn};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Memory usage at {usage_percent:.2}%, cannot start a new conversation")]
    MemoryLimit { usage_percent: f64 },
}

/// Thread-safe in-memory conversation store: user_id -> ordered turns.
///
/// Appends for the same user are serialized by the DashMap shard lock, which
/// is held across the entry lookup and the push. Entries live for the whole
/// process; callers bound what they read with the trimmer.
#[derive(Clone)]
pub struct ConversationStore {
    storage: Arc<DashMap<String, Vec<Turn>>>,

    /// System info for RAM monitoring
    system: Arc<parking_lot::Mutex<System>>,

    /// New conversations are refused at or above this usage
    max_memory_percent: f64,
}

impl ConversationStore {
    pub fn new(max_memory_percent: f64) -> Self {
        info!(
            "Initializing conversation store (memory guard at {:.0}%)",
            max_memory_percent
        );
        Self {
            storage: Arc::new(DashMap::new()),
            system: Arc::new(parking_lot::Mutex::new(System::new())),
            max_memory_percent,
        }
    }

    /// Append a turn to the end of the user's conversation
    pub fn append(
        &self,
        user_id: &str,
        role: Role,
        content: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.push_all(user_id, [Turn::new(role, content)])
    }

    /// Append a user turn and its reply under one lock, so another exchange
    /// for the same user cannot land between them
    pub fn append_pair(
        &self,
        user_id: &str,
        user_content: impl Into<String>,
        assistant_content: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.push_all(
            user_id,
            [Turn::user(user_content), Turn::assistant(assistant_content)],
        )
    }

    fn push_all<const N: usize>(&self, user_id: &str, turns: [Turn; N]) -> Result<(), StoreError> {
        if let Some(mut entry) = self.storage.get_mut(user_id) {
            entry.extend(turns);
            debug!("Appended {} turn(s) for user {} (now {})", N, user_id, entry.len());
            return Ok(());
        }

        self.check_memory()?;

        // Another caller may have created the entry since the lookup above;
        // the entry API re-checks under the shard write lock.
        let mut entry = self.storage.entry(user_id.to_string()).or_default();
        entry.extend(turns);
        debug!("Started conversation for user {} with {} turn(s)", user_id, entry.len());
        Ok(())
    }

    /// Snapshot of the user's conversation, empty if the user is unknown
    pub fn get(&self, user_id: &str) -> Vec<Turn> {
        self.storage
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub fn turn_count(&self, user_id: &str) -> usize {
        self.storage.get(user_id).map_or(0, |entry| entry.len())
    }

    /// Number of conversations held
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    fn check_memory(&self) -> Result<(), StoreError> {
        let mut sys = self.system.lock();
        sys.refresh_memory();

        let total_memory = sys.total_memory();
        if total_memory == 0 {
            // Memory info unavailable (some containers); nothing to enforce
            return Ok(());
        }

        let used_memory = sys.used_memory();
        let usage_percent = (used_memory as f64 / total_memory as f64) * 100.0;

        if usage_percent >= self.max_memory_percent {
            warn!(
                "Memory usage at {:.2}% (used: {} MB, total: {} MB), rejecting new conversation",
                usage_percent,
                used_memory / 1024 / 1024,
                total_memory / 1024 / 1024
            );
            return Err(StoreError::MemoryLimit { usage_percent });
        }

        Ok(())
    }

    /// Get store statistics for monitoring
    pub fn stats(&self) -> StoreStats {
        let total_turns = self.storage.iter().map(|entry| entry.len()).sum();

        let mut sys = self.system.lock();
        sys.refresh_memory();
        let total = sys.total_memory();
        let used = sys.used_memory();

        StoreStats {
            conversations: self.len(),
            total_turns,
            memory_usage_mb: used / 1024 / 1024,
            memory_total_mb: total / 1024 / 1024,
            memory_usage_percent: if total == 0 {
                0.0
            } else {
                (used as f64 / total as f64) * 100.0
            },
        }
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(90.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_get_unknown_user_is_empty() {
        let store = ConversationStore::new(100.0);
        assert!(store.get("never-seen").is_empty());
        assert_eq!(store.turn_count("never-seen"), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_appends_keep_call_order() {
        let store = ConversationStore::new(100.0);
        store.append("guest-1", Role::User, "5 days").unwrap();
        store.append("guest-1", Role::Assistant, "Which base area?").unwrap();
        store.append("guest-1", Role::User, "Ubud").unwrap();

        let turns = store.get("guest-1");
        assert_eq!(
            turns,
            vec![
                Turn::user("5 days"),
                Turn::assistant("Which base area?"),
                Turn::user("Ubud"),
            ]
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_users_are_isolated() {
        let store = ConversationStore::new(100.0);
        store.append("a", Role::User, "hi from a").unwrap();
        store.append("b", Role::User, "hi from b").unwrap();

        assert_eq!(store.get("a"), vec![Turn::user("hi from a")]);
        assert_eq!(store.get("b"), vec![Turn::user("hi from b")]);
    }

    #[test]
    fn test_get_returns_snapshot() {
        let store = ConversationStore::new(100.0);
        store.append("a", Role::User, "first").unwrap();
        let snapshot = store.get("a");
        store.append("a", Role::User, "second").unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.turn_count("a"), 2);
    }

    #[test]
    fn test_memory_guard_blocks_only_new_conversations() {
        let open = ConversationStore::new(100.0);
        open.append("existing", Role::User, "hello").unwrap();

        // Same storage, guard that always trips
        let strict = ConversationStore {
            max_memory_percent: 0.0,
            ..open.clone()
        };

        let total = strict.system.lock().total_memory();
        let err = strict.append("newcomer", Role::User, "hello");
        if total > 0 {
            assert!(matches!(err, Err(StoreError::MemoryLimit { .. })));
            assert!(strict.get("newcomer").is_empty());
        }

        strict.append("existing", Role::Assistant, "still fine").unwrap();
        assert_eq!(strict.turn_count("existing"), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_distinct_users() {
        let store = ConversationStore::new(100.0);

        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let user = format!("user-{i}");
                    for n in 0..10 {
                        store.append(&user, Role::User, format!("{user}:{n}")).unwrap();
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        for result in futures::future::join_all(tasks).await {
            result.unwrap();
        }

        assert_eq!(store.len(), 50);
        for i in 0..50 {
            let user = format!("user-{i}");
            let expected: Vec<Turn> = (0..10)
                .map(|n| Turn::user(format!("{user}:{n}")))
                .collect();
            assert_eq!(store.get(&user), expected);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_same_user_loses_nothing() {
        let store = ConversationStore::new(100.0);

        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .append_pair("shared", format!("q{i}"), format!("a{i}"))
                        .unwrap();
                })
            })
            .collect();

        for result in futures::future::join_all(tasks).await {
            result.unwrap();
        }

        let turns = store.get("shared");
        assert_eq!(turns.len(), 100);

        // Every question is immediately followed by its own answer
        let mut seen = HashSet::new();
        for pair in turns.chunks(2) {
            let question = pair[0].content().trim_start_matches('q');
            let answer = pair[1].content().trim_start_matches('a');
            assert_eq!(pair[0].role(), Role::User);
            assert_eq!(pair[1].role(), Role::Assistant);
            assert_eq!(question, answer);
            assert!(seen.insert(question.to_string()), "duplicate turn {question}");
        }
        assert_eq!(seen.len(), 50);
    }

    #[test]
    fn test_stats() {
        let store = ConversationStore::new(100.0);
        store.append_pair("a", "q", "r").unwrap();
        store.append("b", Role::User, "q").unwrap();

        let stats = store.stats();
        assert_eq!(stats.conversations, 2);
        assert_eq!(stats.total_turns, 3);
        assert!(stats.memory_usage_percent >= 0.0);
    }
}
