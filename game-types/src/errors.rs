use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Rationed per-word or per-round resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Resource {
    Shuffles,
    Arrangements, // No unseen letter order left for this word
    TimeBoost,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Shuffles => "shuffles",
            Resource::Arrangements => "new arrangements",
            Resource::TimeBoost => "time boost",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, thiserror::Error)]
#[ts(export)]
pub enum RoundError {
    #[error("No {resource} remaining")]
    ExhaustedResource { resource: Resource },
    #[error("The {resource} was already used this round")]
    AlreadyConsumed { resource: Resource },
    #[error("Invalid round state: {reason}")]
    InvalidRoundState { reason: String },
    #[error("Round {round_id} not found")]
    RoundNotFound { round_id: String },
}

impl RoundError {
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        RoundError::InvalidRoundState {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable name sent alongside the message
    pub fn kind(&self) -> &'static str {
        match self {
            RoundError::ExhaustedResource { .. } => "ExhaustedResource",
            RoundError::AlreadyConsumed { .. } => "AlreadyConsumed",
            RoundError::InvalidRoundState { .. } => "InvalidRoundState",
            RoundError::RoundNotFound { .. } => "RoundNotFound",
        }
    }
}
