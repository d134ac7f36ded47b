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
                    .table(RoundResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoundResults::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    // One row per round keeps stats submission idempotent
                    .col(
                        ColumnDef::new(RoundResults::RoundId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(RoundResults::PlayerId).string().not_null())
                    .col(ColumnDef::new(RoundResults::ShareId).string().not_null())
                    .col(ColumnDef::new(RoundResults::PuzzleId).string().not_null())
                    .col(ColumnDef::new(RoundResults::Theme).string().not_null())
                    .col(ColumnDef::new(RoundResults::Score).integer().not_null())
                    .col(ColumnDef::new(RoundResults::WordsSolved).integer().not_null())
                    .col(ColumnDef::new(RoundResults::TotalWords).integer().not_null())
                    .col(ColumnDef::new(RoundResults::AnagramsFound).integer().not_null())
                    .col(ColumnDef::new(RoundResults::TotalTime).integer().not_null())
                    .col(
                        ColumnDef::new(RoundResults::PlayedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_round_results_player")
                            .from(RoundResults::Table, RoundResults::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_round_results_player_played_at")
                    .table(RoundResults::Table)
                    .col(RoundResults::PlayerId)
                    .col(RoundResults::PlayedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoundResults::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RoundResults {
    Table,
    Id,
    RoundId,
    PlayerId,
    ShareId,
    PuzzleId,
    Theme,
    Score,
    WordsSolved,
    TotalWords,
    AnagramsFound,
    TotalTime,
    PlayedAt,
}
