pub mod config;
pub mod puzzle;
pub mod round_state;
pub mod scoring;
pub mod summary;
pub mod word_validation;

// Re-export main components
pub use config::*;
pub use puzzle::*;
pub use round_state::*;
pub use scoring::*;
pub use summary::*;
pub use word_validation::*;
