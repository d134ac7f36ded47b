use sea_orm_migration::prelude::*;

use crate::m20240601_000001_create_players_table::Players;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlayerStats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlayerStats::PlayerId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(counter(PlayerStats::GamesPlayed))
                    .col(counter(PlayerStats::TotalScore))
                    .col(counter(PlayerStats::BestScore))
                    .col(
                        ColumnDef::new(PlayerStats::AvgScore)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(counter(PlayerStats::TotalWordsSolved))
                    .col(counter(PlayerStats::TotalAnagramsFound))
                    .col(counter(PlayerStats::Streak))
                    .col(ColumnDef::new(PlayerStats::LastPlayedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_stats_player")
                            .from(PlayerStats::Table, PlayerStats::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Leaderboard ordering
        manager
            .create_index(
                Index::create()
                    .name("idx_player_stats_best_score")
                    .table(PlayerStats::Table)
                    .col(PlayerStats::BestScore)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlayerStats::Table).to_owned())
            .await
    }
}

fn counter(column: PlayerStats) -> ColumnDef {
    ColumnDef::new(column).integer().not_null().default(0).to_owned()
}

#[derive(DeriveIden)]
enum PlayerStats {
    Table,
    PlayerId,
    GamesPlayed,
    TotalScore,
    BestScore,
    AvgScore,
    TotalWordsSolved,
    TotalAnagramsFound,
    Streak,
    LastPlayedAt,
}
