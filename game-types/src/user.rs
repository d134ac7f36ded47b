use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{PlayerId, RoundId, RoundResults};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Player {
    pub id: PlayerId,
    pub email: String,
    pub display_name: String,
    pub created_at: String, // ISO 8601 string for simplicity
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerStats {
    pub games_played: u32,
    pub total_score: u32,
    pub best_score: u32,
    pub avg_score: f64,
    pub total_words_solved: u32,
    pub total_anagrams_found: u32,
    pub streak: u32,
    pub last_played_at: Option<String>, // ISO 8601 string
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecentRound {
    pub date: String,
    pub score: u32,
    pub words_solved: u32,
    pub total_words: u32,
    pub theme: String,
    pub anagrams: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerStatsView {
    pub player: Player,
    pub stats: PlayerStats,
    pub recent_rounds: Vec<RecentRound>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub display_name: String,
    pub best_score: u32,
    pub anagrams: u32,
    pub games: u32,
    pub is_current_player: bool,
}

/// Top of the board, plus the caller's own placing wherever it falls
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LeaderboardView {
    pub entries: Vec<LeaderboardEntry>,
    pub current_player: Option<LeaderboardEntry>,
    pub total_players: u64,
}

/// What a completed round contributes to a player's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round_id: RoundId,
    pub share_id: String,
    pub puzzle_id: String,
    pub theme: String,
    pub score: u32,
    pub words_solved: u32,
    pub total_words: u32,
    pub anagrams_found: u32,
    pub total_time: u32,
}

impl From<&RoundResults> for RoundRecord {
    fn from(results: &RoundResults) -> Self {
        Self {
            round_id: results.round_id,
            share_id: results.share_id.clone(),
            puzzle_id: results.puzzle_id.clone(),
            theme: results.theme.clone(),
            score: results.score,
            words_solved: results.words_solved,
            total_words: results.total_words,
            anagrams_found: results.total_anagrams,
            total_time: results.total_time,
        }
    }
}
