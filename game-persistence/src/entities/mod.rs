pub mod prelude;

pub mod player_stats;
pub mod players;
pub mod round_results;
