use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::matchmaking::{self, SweepOutcome};
use crate::{directory, AppState};

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SweepResponse {
    GameCreated {
        game_name: String,
        player_count: usize,
    },
    InsufficientRequests {
        queued: usize,
        needed: u32,
    },
}

/// Queue a matchmaking request for the calling player.
pub async fn submit_request(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<SubmitResponse>, ApiError> {
    let player = directory::resolve_player(&state.store, &identity).await?;
    matchmaking::submit_request(&state.store, &player).await?;

    Ok(Json(SubmitResponse {
        message: "Matchmaking request received. You will be placed in a game once enough players are waiting.".to_string(),
    }))
}

/// Trigger one matchmaking sweep.
///
/// Invoked by the scheduler (or manually); carries no end-user identity.
/// Too few queued players is a successful outcome, not an error.
pub async fn run_sweep(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SweepResponse>, ApiError> {
    let outcome = matchmaking::sweep(&state.store, &state.config.matchmaking).await?;

    let response = match outcome {
        SweepOutcome::GameCreated { game, player_count } => SweepResponse::GameCreated {
            game_name: game.name,
            player_count,
        },
        SweepOutcome::NotEnoughPlayers { queued, needed } => SweepResponse::InsufficientRequests {
            queued,
            needed,
        },
    };

    Ok(Json(response))
}
