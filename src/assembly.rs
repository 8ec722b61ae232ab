//! Game assembly: turns a batch of consumed matchmaking requests into a
//! game with its memberships, committed as one atomic store batch.

use crate::error::ApiError;
use crate::models::Game;
use crate::store::{NewMembership, QueuedRequest, RecordStore, StoreError};

/// Separator between member names in a game's display name
pub const GAME_NAME_SEPARATOR: &str = " vs. ";

/// Build the display name for a game: member names joined in request order.
pub fn game_name(requests: &[QueuedRequest]) -> String {
    requests
        .iter()
        .map(|q| q.player.display_name.as_str())
        .collect::<Vec<_>>()
        .join(GAME_NAME_SEPARATOR)
}

/// Assemble one game from an ordered, non-empty batch of requests.
///
/// The game, one membership per request (turn_order following request
/// order), and the deletion of the consumed requests commit as a single
/// batch: on any failure nothing is persisted and the requests stay queued.
pub async fn assemble(
    store: &dyn RecordStore,
    requests: &[QueuedRequest],
    map_name: &str,
) -> Result<Game, ApiError> {
    if requests.is_empty() {
        return Err(ApiError::Assembly("empty request batch".to_string()));
    }

    let map = store
        .find_map_by_name(map_name)
        .await?
        .ok_or_else(|| ApiError::Assembly(format!("map '{}' is not provisioned", map_name)))?;

    let name = game_name(requests);
    let members: Vec<NewMembership> = requests
        .iter()
        .enumerate()
        .map(|(order, q)| NewMembership {
            player_id: q.player.player_id,
            turn_order: order as i32,
        })
        .collect();
    let consumed: Vec<i64> = requests.iter().map(|q| q.request.id).collect();

    let game = match store
        .commit_assembly(&name, map.map_id, &members, &consumed)
        .await
    {
        Ok(game) => game,
        Err(StoreError::RequestsClaimed) => {
            return Err(ApiError::Assembly(
                "requests were claimed by a concurrent sweep".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        "Assembled game '{}' ({}) with {} players on map {}",
        game.name,
        game.game_id,
        members.len(),
        map.name
    );

    Ok(game)
}
