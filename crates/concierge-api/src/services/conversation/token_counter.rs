use unicode_segmentation::UnicodeSegmentation;

use super::types::Turn;

/// Approximate characters per token for mixed English/Indonesian text
const CHARS_PER_TOKEN: usize = 4;

/// Fixed cost of the role/separator framing around each message
const TURN_OVERHEAD_TOKENS: usize = 4;

pub struct TokenCounter;

impl TokenCounter {
    pub fn count_text(text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }

        let char_count = text.graphemes(true).count();
        char_count.div_ceil(CHARS_PER_TOKEN).max(1)
    }

    pub fn count_turn(turn: &Turn) -> usize {
        Self::count_text(turn.content()) + TURN_OVERHEAD_TOKENS
    }

    pub fn count_turns(turns: &[Turn]) -> usize {
        turns.iter().map(Self::count_turn).sum()
    }
}
