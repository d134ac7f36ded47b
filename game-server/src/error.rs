use game_types::{ErrorResponse, RoundError};
use warp::http::StatusCode;

use crate::auth::AuthError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Round(#[from] RoundError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Authentication required")]
    Unauthenticated,
    #[error("This round belongs to another player")]
    Forbidden,
    #[error("{0}")]
    BadRequest(String),
    #[error("Storage failure")]
    Persistence(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Round(RoundError::RoundNotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Round(RoundError::InvalidRoundState { .. }) => StatusCode::CONFLICT,
            ApiError::Round(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) | ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Round(err) => err.kind(),
            ApiError::Auth(_) | ApiError::Unauthenticated => "Unauthenticated",
            ApiError::Forbidden => "Forbidden",
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::Persistence(_) => "Persistence",
        }
    }

    pub fn into_reply(self) -> warp::reply::WithStatus<warp::reply::Json> {
        if let ApiError::Persistence(ref err) = self {
            tracing::error!("Request failed on storage: {:#}", err);
        }
        warp::reply::with_status(
            warp::reply::json(&ErrorResponse {
                error: self.to_string(),
                kind: self.kind().to_string(),
            }),
            self.status(),
        )
    }
}
