use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by the service operations.
///
/// Every error is terminal for the current operation; there are no automatic
/// retries here. The one exception is the turn ledger's conflict-resolution
/// loop, which is conflict handling rather than failure retry.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("no player record exists for this identity")]
    NoPlayerRecord,

    #[error("a matchmaking request is already queued for this player")]
    AlreadyQueued,

    #[error("player is not a member of this game")]
    NotAMember,

    #[error("game not found")]
    NotFound,

    #[error("turn state payload is missing")]
    InvalidTurnPayload,

    #[error("game assembly failed: {0}")]
    Assembly(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::NoPlayerRecord => StatusCode::FORBIDDEN,
            ApiError::AlreadyQueued => StatusCode::CONFLICT,
            ApiError::NotAMember => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidTurnPayload => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Assembly(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
