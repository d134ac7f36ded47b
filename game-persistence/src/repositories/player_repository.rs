use anyhow::{Result, anyhow};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use crate::entities::{player_stats, players, prelude::*};
use game_types::{LeaderboardEntry, LeaderboardView, Player, PlayerId};

pub struct PlayerRepository {
    db: DatabaseConnection,
}

impl PlayerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_player(model: players::Model) -> Player {
        Player {
            id: model.id,
            email: model.email,
            display_name: model.display_name,
            created_at: model.created_at.to_rfc3339(),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Player>> {
        let model = Players::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(model.map(Self::model_to_player))
    }

    /// Creates the player on first sign-in. An existing player keeps the
    /// display name they chose; only the email is refreshed.
    pub async fn upsert(&self, id: &str, email: &str, display_name: &str) -> Result<Player> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
        let model = players::ActiveModel {
            id: ActiveValue::Set(id.to_string()),
            email: ActiveValue::Set(email.to_string()),
            display_name: ActiveValue::Set(display_name.to_string()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        Players::insert(model)
            .on_conflict(
                OnConflict::column(players::Column::Id)
                    .update_columns([players::Column::Email, players::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| anyhow!("Failed to retrieve player {}", id))
    }

    pub async fn set_display_name(&self, id: &PlayerId, display_name: &str) -> Result<Player> {
        let player = Players::find_by_id(id.clone())
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow!("Player not found"))?;

        let updated = players::ActiveModel {
            id: ActiveValue::Unchanged(player.id),
            email: ActiveValue::Unchanged(player.email),
            display_name: ActiveValue::Set(display_name.to_string()),
            created_at: ActiveValue::Unchanged(player.created_at),
            updated_at: ActiveValue::Set(chrono::Utc::now().into()),
        };

        let saved = Players::update(updated).exec(&self.db).await?;
        Ok(Self::model_to_player(saved))
    }

    fn model_to_entry(
        rank: u32,
        stats: player_stats::Model,
        player: players::Model,
        current_player: Option<&str>,
    ) -> LeaderboardEntry {
        LeaderboardEntry {
            rank,
            is_current_player: current_player == Some(player.id.as_str()),
            display_name: player.display_name,
            best_score: stats.best_score.max(0) as u32,
            anagrams: stats.total_anagrams_found.max(0) as u32,
            games: stats.games_played.max(0) as u32,
        }
    }

    /// Players ordered by best score, highest first, then by anagrams found
    pub async fn leaderboard(
        &self,
        limit: u64,
        current_player: Option<&str>,
    ) -> Result<LeaderboardView> {
        let rows = PlayerStats::find()
            .find_also_related(Players)
            .order_by_desc(player_stats::Column::BestScore)
            .order_by_desc(player_stats::Column::TotalAnagramsFound)
            .limit(limit)
            .all(&self.db)
            .await?;

        let entries: Vec<LeaderboardEntry> = rows
            .into_iter()
            .filter_map(|(stats, player)| player.map(|player| (stats, player)))
            .enumerate()
            .map(|(index, (stats, player))| {
                Self::model_to_entry((index + 1) as u32, stats, player, current_player)
            })
            .collect();

        let current_player = match current_player {
            Some(id) => match entries.iter().find(|entry| entry.is_current_player) {
                Some(entry) => Some(entry.clone()),
                None => self.ranked_entry(id).await?,
            },
            None => None,
        };
        let total_players = PlayerStats::find().count(&self.db).await?;

        Ok(LeaderboardView {
            entries,
            current_player,
            total_players,
        })
    }

    /// A player's placing on the full board, `None` until they finish a round
    pub async fn ranked_entry(&self, id: &str) -> Result<Option<LeaderboardEntry>> {
        let row = PlayerStats::find_by_id(id.to_string())
            .find_also_related(Players)
            .one(&self.db)
            .await?;
        let Some((stats, Some(player))) = row else {
            return Ok(None);
        };

        let players_above = PlayerStats::find()
            .filter(
                Condition::any()
                    .add(player_stats::Column::BestScore.gt(stats.best_score))
                    .add(
                        Condition::all()
                            .add(player_stats::Column::BestScore.eq(stats.best_score))
                            .add(
                                player_stats::Column::TotalAnagramsFound
                                    .gt(stats.total_anagrams_found),
                            ),
                    ),
            )
            .count(&self.db)
            .await?;

        Ok(Some(Self::model_to_entry(
            players_above as u32 + 1,
            stats,
            player,
            Some(id),
        )))
    }
}
