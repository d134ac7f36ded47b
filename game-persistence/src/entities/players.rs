use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "players")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::player_stats::Entity")]
    PlayerStats,
    #[sea_orm(has_many = "super::round_results::Entity")]
    RoundResults,
}

impl Related<super::player_stats::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlayerStats.def()
    }
}

impl Related<super::round_results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoundResults.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
