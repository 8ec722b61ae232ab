//! Turn ledger: the append-only, strictly ordered log of game state
//! snapshots.
//!
//! Appends compute the next number from the latest persisted turn and rely
//! on the store's (game, number) uniqueness constraint to detect concurrent
//! writers: the loser re-reads and retries with the updated number, so
//! numbering stays contiguous with no duplicates.

use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{GamePlayer, Turn};
use crate::store::{RecordStore, StoreError};

/// Attempts before giving up on a contended append. Each retry re-reads the
/// latest number, so exhaustion means pathological contention, not livelock.
const APPEND_ATTEMPTS: u32 = 8;

/// The turn with the highest number for a game, or `None` before the first
/// turn. Pure read, safe for concurrent callers.
pub async fn current_turn(
    store: &dyn RecordStore,
    game_id: Uuid,
) -> Result<Option<Turn>, ApiError> {
    Ok(store.latest_turn(game_id).await?)
}

/// Append a turn on behalf of a membership.
///
/// The payload is opaque; only its presence is checked. The assigned number
/// is latest + 1, re-derived on every conflict retry.
pub async fn append_turn(
    store: &dyn RecordStore,
    membership: &GamePlayer,
    state: serde_json::Value,
) -> Result<Turn, ApiError> {
    if state.is_null() {
        return Err(ApiError::InvalidTurnPayload);
    }

    let game_id = membership.game_id;
    let mut attempts = 0;

    loop {
        let latest = store
            .latest_turn(game_id)
            .await?
            .map(|t| t.turn_number)
            .unwrap_or(0);
        let number = latest + 1;

        match store
            .insert_turn(game_id, membership.id, number, &state)
            .await
        {
            Ok(turn) => {
                tracing::info!(
                    "Recorded turn {} for game {} by membership {}",
                    turn.turn_number,
                    game_id,
                    membership.id
                );
                return Ok(turn);
            }
            Err(StoreError::DuplicateTurn { .. }) if attempts < APPEND_ATTEMPTS => {
                attempts += 1;
                tracing::debug!(
                    "Turn {} for game {} taken by a concurrent writer, retrying",
                    number,
                    game_id
                );
            }
            Err(e) => return Err(e.into()),
        }
    }
}
