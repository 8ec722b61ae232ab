//! Player directory: binds authenticated identities to player records.
//!
//! Every player-scoped operation resolves the caller through here before
//! touching the queue, the access gate, or the ledger.

use crate::auth::Identity;
use crate::error::ApiError;
use crate::models::Player;
use crate::store::RecordStore;

/// Find the unique player bound to an identity.
pub async fn resolve_player(
    store: &dyn RecordStore,
    identity: &Identity,
) -> Result<Player, ApiError> {
    store
        .find_player_by_user(identity.user_id)
        .await?
        .ok_or(ApiError::NoPlayerRecord)
}

/// Create the player record for an identity, or return the existing one.
pub async fn register_player(
    store: &dyn RecordStore,
    identity: &Identity,
) -> Result<Player, ApiError> {
    let player = store
        .ensure_player(identity.user_id, &identity.username)
        .await?;
    tracing::info!(
        "Registered player {} for user {}",
        player.display_name,
        player.user_id
    );
    Ok(player)
}
