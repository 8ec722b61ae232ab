use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::models::Turn;
use crate::store::RecordStore;
use crate::{access, directory, ledger, AppState};

#[derive(Debug, Serialize)]
pub struct GameSummary {
    pub game_id: Uuid,
    pub game_name: String,
}

#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub game_id: Uuid,
    pub game_name: String,
    pub map_name: String,
    /// 0 before the first turn is recorded
    pub turn_number: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_state: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct PostTurnRequest {
    /// Opaque game state payload; stored as submitted
    #[serde(default)]
    pub state: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct PostTurnResponse {
    pub message: String,
    pub turn_number: i32,
}

/// List the games the calling player is a member of, oldest first.
pub async fn list_games(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<Vec<GameSummary>>, ApiError> {
    let player = directory::resolve_player(&state.store, &identity).await?;
    let games = state.store.games_for_player(player.player_id).await?;

    let summaries = games
        .into_iter()
        .map(|g| GameSummary {
            game_id: g.game_id,
            game_name: g.name,
        })
        .collect();

    Ok(Json(summaries))
}

/// Build the game view from resolved access and the latest turn, if any.
/// A game with no turns reports turn_number 0 and omits the state.
fn game_response(game_access: access::GameAccess, current: Option<Turn>) -> GameResponse {
    let (turn_number, current_state) = match current {
        Some(turn) => (turn.turn_number, Some(turn.state)),
        None => (0, None),
    };

    GameResponse {
        game_id: game_access.game.game_id,
        game_name: game_access.game.name,
        map_name: game_access.map.name,
        turn_number,
        current_state,
    }
}

/// Fetch one game with its latest recorded state. Members only.
pub async fn get_game(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(game_id): Path<Uuid>,
) -> Result<Json<GameResponse>, ApiError> {
    let player = directory::resolve_player(&state.store, &identity).await?;
    let game_access = access::resolve_membership(&state.store, &player, game_id).await?;

    let current = ledger::current_turn(&state.store, game_id).await?;

    Ok(Json(game_response(game_access, current)))
}

/// Record a new turn for a game. Members only; the payload must be present.
pub async fn post_turn(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(game_id): Path<Uuid>,
    Json(payload): Json<PostTurnRequest>,
) -> Result<Json<PostTurnResponse>, ApiError> {
    let player = directory::resolve_player(&state.store, &identity).await?;
    let game_access = access::resolve_membership(&state.store, &player, game_id).await?;

    let turn = ledger::append_turn(&state.store, &game_access.membership, payload.state).await?;

    Ok(Json(PostTurnResponse {
        message: format!("Turn {} recorded.", turn.turn_number),
        turn_number: turn.turn_number,
    }))
}
