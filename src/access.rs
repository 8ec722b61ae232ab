//! Game access gate: membership is the sole basis for exposing game state.

use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Game, GameMap, GamePlayer, Player};
use crate::store::{RecordStore, StoreError};

/// A game a player has been verified to belong to, with its map resolved.
#[derive(Debug, Clone)]
pub struct GameAccess {
    pub game: Game,
    pub membership: GamePlayer,
    pub map: GameMap,
}

/// Verify that a player is a member of a game.
///
/// Fails with `NotFound` if no such game exists, and `NotAMember` if the
/// game exists but the player has no membership record for it. No other
/// check grants access.
pub async fn resolve_membership(
    store: &dyn RecordStore,
    player: &Player,
    game_id: Uuid,
) -> Result<GameAccess, ApiError> {
    let game = store.find_game(game_id).await?.ok_or(ApiError::NotFound)?;

    let membership = store
        .find_membership(game_id, player.player_id)
        .await?
        .ok_or(ApiError::NotAMember)?;

    // The map is referenced by the game row, so a miss means corrupt state
    let map = store.find_map(game.map_id).await?.ok_or_else(|| {
        StoreError::Inconsistent(format!(
            "game {} references missing map {}",
            game.game_id, game.map_id
        ))
    })?;

    Ok(GameAccess {
        game,
        membership,
        map,
    })
}
