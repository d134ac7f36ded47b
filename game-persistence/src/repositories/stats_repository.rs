use anyhow::Result;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use tracing::{debug, info};

use crate::entities::{player_stats, prelude::*, round_results};
use game_types::{PlayerStats as PlayerStatsView, RecentRound, RoundRecord};

const RECENT_ROUND_LIMIT: u64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Applied(PlayerStatsView),
    /// The round id was already recorded; aggregates are untouched
    Duplicate,
}

pub struct StatsRepository {
    db: DatabaseConnection,
}

impl StatsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_stats(model: player_stats::Model) -> PlayerStatsView {
        PlayerStatsView {
            games_played: model.games_played.max(0) as u32,
            total_score: model.total_score.max(0) as u32,
            best_score: model.best_score.max(0) as u32,
            avg_score: model.avg_score,
            total_words_solved: model.total_words_solved.max(0) as u32,
            total_anagrams_found: model.total_anagrams_found.max(0) as u32,
            streak: model.streak.max(0) as u32,
            last_played_at: model.last_played_at.map(|at| at.to_rfc3339()),
        }
    }

    fn empty_stats() -> PlayerStatsView {
        PlayerStatsView {
            games_played: 0,
            total_score: 0,
            best_score: 0,
            avg_score: 0.0,
            total_words_solved: 0,
            total_anagrams_found: 0,
            streak: 0,
            last_played_at: None,
        }
    }

    /// Merges a completed round into the player's aggregate. Recording the same
    /// round id again leaves everything unchanged.
    pub async fn record_round(&self, player_id: &str, record: &RoundRecord) -> Result<RecordOutcome> {
        self.record_round_at(player_id, record, Utc::now().into()).await
    }

    pub async fn record_round_at(
        &self,
        player_id: &str,
        record: &RoundRecord,
        now: DateTimeWithTimeZone,
    ) -> Result<RecordOutcome> {
        let txn = self.db.begin().await?;

        let previous = RoundResults::find()
            .filter(round_results::Column::PlayerId.eq(player_id))
            .order_by_desc(round_results::Column::PlayedAt)
            .one(&txn)
            .await?;

        let row = round_results::ActiveModel {
            id: ActiveValue::NotSet,
            round_id: ActiveValue::Set(record.round_id),
            player_id: ActiveValue::Set(player_id.to_string()),
            share_id: ActiveValue::Set(record.share_id.clone()),
            puzzle_id: ActiveValue::Set(record.puzzle_id.clone()),
            theme: ActiveValue::Set(record.theme.clone()),
            score: ActiveValue::Set(record.score as i32),
            words_solved: ActiveValue::Set(record.words_solved as i32),
            total_words: ActiveValue::Set(record.total_words as i32),
            anagrams_found: ActiveValue::Set(record.anagrams_found as i32),
            total_time: ActiveValue::Set(record.total_time as i32),
            played_at: ActiveValue::Set(now),
        };

        let inserted = RoundResults::insert(row)
            .on_conflict(
                OnConflict::column(round_results::Column::RoundId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        if inserted == 0 {
            txn.rollback().await?;
            debug!("Round {} already recorded", record.round_id);
            return Ok(RecordOutcome::Duplicate);
        }

        let existing = PlayerStats::find_by_id(player_id.to_string())
            .one(&txn)
            .await?;

        let streak = match (&existing, &previous) {
            (Some(stats), Some(last)) if (now - last.played_at).num_days() <= 1 => stats.streak + 1,
            _ => 1,
        };

        let score = record.score as i32;
        let (games_played, total_score, best_score, words_solved, anagrams) = match &existing {
            Some(stats) => (
                stats.games_played + 1,
                stats.total_score + score,
                stats.best_score.max(score),
                stats.total_words_solved + record.words_solved as i32,
                stats.total_anagrams_found + record.anagrams_found as i32,
            ),
            None => (
                1,
                score,
                score,
                record.words_solved as i32,
                record.anagrams_found as i32,
            ),
        };

        let saved = player_stats::Model {
            player_id: player_id.to_string(),
            games_played,
            total_score,
            best_score,
            avg_score: total_score as f64 / games_played as f64,
            total_words_solved: words_solved,
            total_anagrams_found: anagrams,
            streak,
            last_played_at: Some(now),
        };

        let model = player_stats::ActiveModel {
            player_id: ActiveValue::Set(saved.player_id.clone()),
            games_played: ActiveValue::Set(saved.games_played),
            total_score: ActiveValue::Set(saved.total_score),
            best_score: ActiveValue::Set(saved.best_score),
            avg_score: ActiveValue::Set(saved.avg_score),
            total_words_solved: ActiveValue::Set(saved.total_words_solved),
            total_anagrams_found: ActiveValue::Set(saved.total_anagrams_found),
            streak: ActiveValue::Set(saved.streak),
            last_played_at: ActiveValue::Set(saved.last_played_at),
        };

        if existing.is_some() {
            PlayerStats::update(model).exec(&txn).await?;
        } else {
            PlayerStats::insert(model).exec_without_returning(&txn).await?;
        }

        txn.commit().await?;
        info!(
            "Recorded round {} for player {} (score {}, streak {})",
            record.round_id, player_id, record.score, saved.streak
        );
        Ok(RecordOutcome::Applied(Self::model_to_stats(saved)))
    }

    /// Aggregate stats, zeroed for a player who has not finished a round
    pub async fn get_stats(&self, player_id: &str) -> Result<PlayerStatsView> {
        let model = PlayerStats::find_by_id(player_id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(Self::model_to_stats).unwrap_or_else(Self::empty_stats))
    }

    pub async fn recent_rounds(&self, player_id: &str) -> Result<Vec<RecentRound>> {
        let rounds = RoundResults::find()
            .filter(round_results::Column::PlayerId.eq(player_id))
            .order_by_desc(round_results::Column::PlayedAt)
            .limit(RECENT_ROUND_LIMIT)
            .all(&self.db)
            .await?;

        Ok(rounds
            .into_iter()
            .map(|round| RecentRound {
                date: round.played_at.format("%B %d, %Y").to_string(),
                score: round.score.max(0) as u32,
                words_solved: round.words_solved.max(0) as u32,
                total_words: round.total_words.max(0) as u32,
                theme: round.theme,
                anagrams: round.anagrams_found.max(0) as u32,
            })
            .collect())
    }

    pub async fn is_recorded(&self, round_id: uuid::Uuid) -> Result<bool> {
        let found = RoundResults::find()
            .filter(round_results::Column::RoundId.eq(round_id))
            .one(&self.db)
            .await?;
        Ok(found.is_some())
    }
}
