use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::RoundResults;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GuessRequest {
    #[serde(default)]
    pub guess: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScreenNameRequest {
    pub screen_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResultsResponse {
    #[serde(flatten)]
    pub results: RoundResults,
    pub is_logged_in: bool,
    pub stats_recorded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}
