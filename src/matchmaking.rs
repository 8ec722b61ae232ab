//! Matchmaking queue: request submission and the sweep that converts
//! queued requests into games.

use crate::assembly;
use crate::config::MatchmakingConfig;
use crate::error::ApiError;
use crate::models::{Game, GameRequest, Player};
use crate::store::{RecordStore, StoreError};

/// Outcome of a matchmaking sweep. Too few queued players is an expected
/// steady state, not an error.
#[derive(Debug)]
pub enum SweepOutcome {
    GameCreated { game: Game, player_count: usize },
    NotEnoughPlayers { queued: usize, needed: u32 },
}

/// Queue a matchmaking request for a player.
///
/// Fails with `AlreadyQueued` if the player has an outstanding request.
/// The check-then-insert race is closed by the store's per-player
/// uniqueness constraint.
pub async fn submit_request(
    store: &dyn RecordStore,
    player: &Player,
) -> Result<GameRequest, ApiError> {
    if store
        .find_request_for_player(player.player_id)
        .await?
        .is_some()
    {
        return Err(ApiError::AlreadyQueued);
    }

    let request = match store.create_request(player.player_id).await {
        Ok(request) => request,
        Err(StoreError::RequestExists) => return Err(ApiError::AlreadyQueued),
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        "Queued matchmaking request {} for player {}",
        request.id,
        player.display_name
    );
    Ok(request)
}

/// Consume the oldest `min_players` requests into one game.
///
/// Reads the oldest requests in FIFO order; with fewer than `min_players`
/// queued this is a no-op and reports `NotEnoughPlayers`. Otherwise the
/// batch goes to assembly, which commits the game and deletes the consumed
/// requests atomically; if assembly fails the requests remain queued.
pub async fn sweep(
    store: &dyn RecordStore,
    config: &MatchmakingConfig,
) -> Result<SweepOutcome, ApiError> {
    let needed = config.min_players;
    let batch = store.oldest_requests(needed as i64).await?;

    if batch.len() < needed as usize {
        tracing::debug!(
            "Sweep: {} of {} players queued, nothing to do",
            batch.len(),
            needed
        );
        return Ok(SweepOutcome::NotEnoughPlayers {
            queued: batch.len(),
            needed,
        });
    }

    let game = assembly::assemble(store, &batch, &config.default_map).await?;

    Ok(SweepOutcome::GameCreated {
        player_count: batch.len(),
        game,
    })
}
