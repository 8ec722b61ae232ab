use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::Identity;
use crate::directory;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PlayerResponse {
    pub player_id: Uuid,
    pub display_name: String,
}

/// Create the player record for the calling identity, or return the
/// existing one.
pub async fn register(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<PlayerResponse>, ApiError> {
    let player = directory::register_player(&state.store, &identity).await?;

    Ok(Json(PlayerResponse {
        player_id: player.player_id,
        display_name: player.display_name,
    }))
}
