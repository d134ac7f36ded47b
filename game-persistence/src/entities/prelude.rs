pub use super::player_stats::Entity as PlayerStats;
pub use super::players::Entity as Players;
pub use super::round_results::Entity as RoundResults;
