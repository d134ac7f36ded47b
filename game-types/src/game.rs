use crate::RoundId;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RoundStatus {
    InProgress, // A word is on the board
    Completed,  // Every word has been resolved
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum LetterStatus {
    Correct,   // Right letter in the right position
    Incorrect, // Anything else
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LetterFeedback {
    pub letter: String,
    pub status: LetterStatus,
    pub position: u32,
}

/// One resolution event for a word slot. Anagram credits carry `anagram_word`;
/// solved and failed records are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WordResult {
    pub word: String,
    pub jumbled: String,
    pub solved: bool,
    pub attempts: u32,
    pub time_taken: u32,
    pub points: u32,
    pub anagram_word: Option<String>,
}

impl WordResult {
    pub fn is_anagram(&self) -> bool {
        self.anagram_word.is_some()
    }

    pub fn is_terminal(&self) -> bool {
        self.anagram_word.is_none()
    }
}

/// Client-facing view of a round in progress. Never contains the target word.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoundSnapshot {
    pub round_id: RoundId,
    pub share_id: String,
    pub status: RoundStatus,
    pub theme: String,
    pub current_word_index: u32,
    pub total_words: u32,
    pub jumbled_word: Option<String>,
    pub word_length: Option<u32>,
    pub score: u32,
    pub attempt_number: u32,
    pub remaining_attempts: u32,
    pub hint_revealed: bool,
    pub hint: Option<String>,
    pub words_solved: u32,
    pub time_remaining: u32,
    pub shuffle_limit: u32,
    pub shuffles_remaining: u32,
    pub time_boost_available: bool,
    pub time_boost_amount: u32,
    pub bonus_time: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GuessOutcome {
    pub is_correct: bool,
    pub is_anagram: bool,
    pub already_used_anagram: bool,
    pub correct_word: String,
    pub time_remaining: u32,
    pub attempt_number: u32,
    pub feedback: Vec<LetterFeedback>,
    pub points_earned: Option<u32>,
    pub new_score: Option<u32>,
    pub hint_revealed: bool,
    pub hint: Option<String>, // Set only when this guess revealed it
    pub out_of_attempts: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HintResponse {
    pub hint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShuffleResponse {
    pub jumbled_word: String,
    pub shuffles_remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BoostResponse {
    pub time_remaining: u32,
    pub boost_amount: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum AdvanceOutcome {
    Next { snapshot: RoundSnapshot },
    Completed { round_id: RoundId },
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TimerStatus {
    pub time_remaining: u32,
    pub time_expired: bool,
    pub hint_just_revealed: bool,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WordSummary {
    pub word: String,
    pub solved: bool,
    pub attempts: u32,
    pub time_taken: u32,
    pub points: u32,
    pub anagrams: Vec<String>,
}

/// Results screen for a completed round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoundResults {
    pub round_id: RoundId,
    pub share_id: String,
    pub puzzle_id: String,
    pub theme: String,
    pub theme_reflection: String,
    pub score: u32,
    pub max_score: u32,
    pub words_solved: u32,
    pub total_words: u32,
    pub total_anagrams: u32,
    pub time_limit: u32,
    pub total_time: u32,
    pub date: String, // e.g. "October 14, 2026"
    pub results: Vec<WordSummary>,
}
