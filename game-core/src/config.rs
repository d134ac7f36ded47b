use serde::{Deserialize, Serialize};

/// Gameplay constants for a round. Every value can be overridden by the server
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub word_time_limit: u32,         // Seconds per word
    pub max_attempts: u32,            // Misses before a word is exhausted
    pub shuffle_limit: u32,           // Shuffles per word
    pub hint_reveal_attempt: u32,     // Attempt number that auto-reveals the hint
    pub hint_low_time_threshold: u32, // Remaining seconds that auto-reveal the hint
    pub anagram_bonus: u32,
    pub anagram_bonus_time: u32,
    pub time_boost: u32, // Seconds added by the once-per-round boost
    pub base_score: u32,
    pub attempt_weight: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            word_time_limit: 30,
            max_attempts: 3,
            shuffle_limit: 2,
            hint_reveal_attempt: 3,
            hint_low_time_threshold: 10,
            anagram_bonus: 10,
            anagram_bonus_time: 10,
            time_boost: 15,
            base_score: 40,
            attempt_weight: 10,
        }
    }
}
