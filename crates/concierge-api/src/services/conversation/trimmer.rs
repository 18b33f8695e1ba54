use tracing::{debug, warn};

use super::types::{TrimBudget, Turn};

/// Bound a conversation to `budget`, dropping the oldest turns first.
///
/// Returns a contiguous suffix of `conversation` in its original order. A
/// turn is never split. Under a token budget the newest turn is kept even
/// when it alone is over budget, so a non-empty conversation never trims to
/// nothing. A zero budget yields an empty window.
pub fn trim(conversation: &[Turn], budget: TrimBudget) -> Vec<Turn> {
    let start = match budget {
        TrimBudget::MaxTurns(0) | TrimBudget::MaxTokens(0) => return Vec::new(),
        TrimBudget::MaxTurns(max_turns) => conversation.len().saturating_sub(max_turns),
        TrimBudget::MaxTokens(max_tokens) => token_window_start(conversation, max_tokens),
    };

    conversation[start..].to_vec()
}

/// Index of the oldest turn that still fits when walking back from the newest
fn token_window_start(conversation: &[Turn], max_tokens: usize) -> usize {
    let mut used = 0usize;
    let mut start = conversation.len();

    for (idx, turn) in conversation.iter().enumerate().rev() {
        let cost = turn.estimate_tokens();
        let is_newest = idx + 1 == conversation.len();

        if used + cost > max_tokens && !is_newest {
            break;
        }

        used += cost;
        start = idx;
    }

    start
}

/// Configured window applied to every completion request
#[derive(Debug, Clone, Copy)]
pub struct HistoryTrimmer {
    max_turns: usize,
    max_tokens: usize,
}

impl HistoryTrimmer {
    /// Both caps are clamped to at least 1 so the window always carries the
    /// user's newest turn
    pub fn new(max_turns: usize, max_tokens: usize) -> Self {
        if max_turns == 0 || max_tokens == 0 {
            warn!(
                "History window configured with max_turns={}, max_tokens={}; clamping to at least 1",
                max_turns, max_tokens
            );
        }

        Self {
            max_turns: max_turns.max(1),
            max_tokens: max_tokens.max(1),
        }
    }

    /// Turn cap first, then token cap
    pub fn apply(&self, conversation: &[Turn]) -> Vec<Turn> {
        let by_turns = trim(conversation, TrimBudget::MaxTurns(self.max_turns));
        let window = trim(&by_turns, TrimBudget::MaxTokens(self.max_tokens));

        if window.len() < conversation.len() {
            debug!(
                "Trimmed history from {} to {} turns (max_turns={}, max_tokens={})",
                conversation.len(),
                window.len(),
                self.max_turns,
                self.max_tokens
            );
        }

        window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abcd() -> Vec<Turn> {
        vec![
            Turn::user("A"),
            Turn::assistant("B"),
            Turn::user("C"),
            Turn::assistant("D"),
        ]
    }

    #[test]
    fn test_max_turns_keeps_most_recent() {
        let trimmed = trim(&abcd(), TrimBudget::MaxTurns(2));
        assert_eq!(trimmed, vec![Turn::user("C"), Turn::assistant("D")]);
    }

    #[test]
    fn test_max_turns_larger_than_conversation() {
        assert_eq!(trim(&abcd(), TrimBudget::MaxTurns(10)), abcd());
    }

    #[test]
    fn test_zero_budget_is_empty() {
        assert!(trim(&abcd(), TrimBudget::MaxTurns(0)).is_empty());
        assert!(trim(&abcd(), TrimBudget::MaxTokens(0)).is_empty());
    }

    #[test]
    fn test_empty_conversation() {
        assert!(trim(&[], TrimBudget::MaxTurns(3)).is_empty());
        assert!(trim(&[], TrimBudget::MaxTokens(100)).is_empty());
    }

    #[test]
    fn test_token_budget_drops_oldest_whole_turns() {
        let turns = abcd();
        // Each single-letter turn costs the same
        let per_turn = turns[0].estimate_tokens();

        let trimmed = trim(&turns, TrimBudget::MaxTokens(per_turn * 3));
        assert_eq!(trimmed, turns[1..].to_vec());

        // One token short of three turns keeps only two
        let trimmed = trim(&turns, TrimBudget::MaxTokens(per_turn * 3 - 1));
        assert_eq!(trimmed, turns[2..].to_vec());
    }

    #[test]
    fn test_oversized_newest_turn_is_kept_alone() {
        let turns = vec![
            Turn::user("short"),
            Turn::user("a very long message ".repeat(50)),
        ];
        let trimmed = trim(&turns, TrimBudget::MaxTokens(5));
        assert_eq!(trimmed, vec![turns[1].clone()]);
    }

    #[test]
    fn test_gap_in_budget_does_not_skip_turns() {
        // The oversized middle turn must end the window; older small turns
        // may not be pulled in past it
        let turns = vec![
            Turn::user("x"),
            Turn::assistant("long ".repeat(100)),
            Turn::user("y"),
        ];
        let budget = turns[0].estimate_tokens() + turns[2].estimate_tokens();
        let trimmed = trim(&turns, TrimBudget::MaxTokens(budget));
        assert_eq!(trimmed, vec![Turn::user("y")]);
    }

    #[test]
    fn test_trim_is_idempotent() {
        let turns: Vec<Turn> = (0..20)
            .map(|i| {
                if i % 2 == 0 {
                    Turn::user(format!("question {i} ").repeat(i + 1))
                } else {
                    Turn::assistant(format!("answer {i}"))
                }
            })
            .collect();

        let budgets = [
            TrimBudget::MaxTurns(1),
            TrimBudget::MaxTurns(7),
            TrimBudget::MaxTurns(50),
            TrimBudget::MaxTokens(1),
            TrimBudget::MaxTokens(40),
            TrimBudget::MaxTokens(400),
        ];

        for budget in budgets {
            let once = trim(&turns, budget);
            let twice = trim(&once, budget);
            assert_eq!(once, twice, "not idempotent for {budget:?}");
            assert!(!once.is_empty(), "empty window for {budget:?}");
            // Deterministic
            assert_eq!(trim(&turns, budget), once);
        }
    }

    #[test]
    fn test_result_is_suffix_within_budget() {
        let turns: Vec<Turn> = (0..12).map(|i| Turn::user("word ".repeat(i))).collect();
        let budget = 60;
        let trimmed = trim(&turns, TrimBudget::MaxTokens(budget));

        assert!(turns.ends_with(&trimmed));
        let used: usize = trimmed.iter().map(Turn::estimate_tokens).sum();
        assert!(used <= budget);
    }

    #[test]
    fn test_history_trimmer_applies_both_caps() {
        let trimmer = HistoryTrimmer::new(3, 10_000);
        assert_eq!(trimmer.apply(&abcd()), abcd()[1..].to_vec());

        let per_turn = abcd()[0].estimate_tokens();
        let trimmer = HistoryTrimmer::new(3, per_turn * 2);
        assert_eq!(trimmer.apply(&abcd()), abcd()[2..].to_vec());
    }

    #[test]
    fn test_history_trimmer_zero_caps_keep_newest_turn() {
        let trimmer = HistoryTrimmer::new(0, 0);
        assert_eq!(trimmer.apply(&abcd()), vec![Turn::assistant("D")]);

        let trimmer = HistoryTrimmer::new(0, 3000);
        assert_eq!(trimmer.apply(&abcd()), vec![Turn::assistant("D")]);
    }
}
