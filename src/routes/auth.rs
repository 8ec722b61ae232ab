use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiError;
use crate::{auth, AppState};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub user_id: i64,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// JWT token for backend API authentication
    pub access_token: String,
}

/// Issue a JWT for a user identity.
///
/// Stands in for the external authentication provider: upstream identity
/// verification is out of scope for this service, so this route signs a
/// token directly from the supplied identity.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = auth::generate_token(
        payload.user_id,
        &payload.username,
        &state.config.security.jwt_secret,
    )
    .map_err(|e| ApiError::Internal(anyhow::anyhow!("failed to generate token: {}", e)))?;

    tracing::info!(
        "Issued token for user {} ({})",
        payload.username,
        payload.user_id
    );

    Ok(Json(TokenResponse {
        access_token: token,
    }))
}
