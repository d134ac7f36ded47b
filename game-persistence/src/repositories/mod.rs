pub mod player_repository;
pub mod stats_repository;

pub use player_repository::*;
pub use stats_repository::*;
