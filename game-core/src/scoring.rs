use game_types::{LetterFeedback, LetterStatus};

use crate::GameConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringEngine {
    base_score: u32,
    attempt_weight: u32,
    max_attempts: u32,
    anagram_bonus: u32,
}

impl ScoringEngine {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            base_score: config.base_score,
            attempt_weight: config.attempt_weight,
            max_attempts: config.max_attempts,
            anagram_bonus: config.anagram_bonus,
        }
    }

    /// Points for solving a word: base + seconds left + a bonus for every
    /// attempt still unused. Never negative.
    pub fn score_for_word(&self, time_remaining: u32, attempt_number: u32) -> u32 {
        let unused_attempts = self.max_attempts.saturating_add(1).saturating_sub(attempt_number);
        self.base_score
            .saturating_add(time_remaining)
            .saturating_add(unused_attempts.saturating_mul(self.attempt_weight))
    }

    /// Flat credit for an alternate word, independent of time and attempts
    pub fn anagram_bonus(&self) -> u32 {
        self.anagram_bonus
    }

    /// Score of a flawless run: every word solved first try with the full clock
    pub fn max_possible_score(&self, word_count: usize, word_time_limit: u32) -> u32 {
        (word_count as u32).saturating_mul(self.score_for_word(word_time_limit, 1))
    }

    /// Positional feedback up to the shorter of the two words
    pub fn evaluate_guess(guess: &str, target: &str) -> Vec<LetterFeedback> {
        let guess = guess.to_lowercase();
        let target = target.to_lowercase();

        guess
            .chars()
            .zip(target.chars())
            .enumerate()
            .map(|(i, (g, t))| LetterFeedback {
                letter: g.to_string(),
                status: if g == t {
                    LetterStatus::Correct
                } else {
                    LetterStatus::Incorrect
                },
                position: i as u32,
            })
            .collect()
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}
