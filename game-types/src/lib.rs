pub mod game;
pub mod messages;
pub mod user;
pub mod errors;

// Re-export all types
pub use game::*;
pub use messages::*;
pub use user::*;
pub use errors::*;

pub type RoundId = uuid::Uuid;
/// Identity-provider subject for a signed-in player
pub type PlayerId = String;
