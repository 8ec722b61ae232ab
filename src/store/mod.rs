use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Game, GameMap, GamePlayer, GameRequest, Player, Turn};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub async fn create_pool(database_url: &str, max_connections: u32) -> sqlx::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Errors from the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store error: {0}")]
    Database(#[from] sqlx::Error),

    /// The per-player request uniqueness constraint rejected an insert
    #[error("player already has a queued matchmaking request")]
    RequestExists,

    /// The (game, turn_number) uniqueness constraint rejected an insert;
    /// a concurrent writer claimed this number first
    #[error("turn {number} already recorded for game {game_id}")]
    DuplicateTurn { game_id: Uuid, number: i32 },

    /// A concurrent sweep consumed some of the requests this batch tried to
    /// delete; the whole batch was rolled back
    #[error("queued requests were claimed by a concurrent sweep")]
    RequestsClaimed,

    #[error("store returned inconsistent data: {0}")]
    Inconsistent(String),
}

/// A pending matchmaking request joined with the player who submitted it.
#[derive(Debug, Clone)]
pub struct QueuedRequest {
    pub request: GameRequest,
    pub player: Player,
}

/// Membership to create as part of a game assembly batch.
#[derive(Debug, Clone)]
pub struct NewMembership {
    pub player_id: Uuid,
    pub turn_order: i32,
}

/// The durable record store the service is built against.
///
/// All shared state lives behind this seam; no component holds in-process
/// mutable state of its own. Batch operations are atomic: either the whole
/// batch commits or none of it does.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // Players
    async fn find_player_by_user(&self, user_id: i64) -> Result<Option<Player>, StoreError>;

    /// Create the player bound to a user identity, or return the existing
    /// row unchanged if one is already bound. Player records are immutable
    /// once created.
    async fn ensure_player(&self, user_id: i64, display_name: &str) -> Result<Player, StoreError>;

    // Matchmaking requests
    async fn find_request_for_player(
        &self,
        player_id: Uuid,
    ) -> Result<Option<GameRequest>, StoreError>;

    /// Fails with [`StoreError::RequestExists`] if the player already has an
    /// outstanding request.
    async fn create_request(&self, player_id: Uuid) -> Result<GameRequest, StoreError>;

    /// The oldest pending requests in FIFO order (creation time, then
    /// insertion order), each joined with its player.
    async fn oldest_requests(&self, limit: i64) -> Result<Vec<QueuedRequest>, StoreError>;

    // Maps
    async fn find_map(&self, map_id: Uuid) -> Result<Option<GameMap>, StoreError>;
    async fn find_map_by_name(&self, name: &str) -> Result<Option<GameMap>, StoreError>;

    // Games and memberships
    /// Atomically create a game, its memberships, and delete the consumed
    /// requests. If any consumed request no longer exists (a concurrent
    /// sweep claimed it), nothing is persisted and the call fails with
    /// [`StoreError::RequestsClaimed`].
    async fn commit_assembly(
        &self,
        name: &str,
        map_id: Uuid,
        members: &[NewMembership],
        consumed_request_ids: &[i64],
    ) -> Result<Game, StoreError>;

    async fn find_game(&self, game_id: Uuid) -> Result<Option<Game>, StoreError>;

    /// Games the player is a member of, oldest first.
    async fn games_for_player(&self, player_id: Uuid) -> Result<Vec<Game>, StoreError>;

    async fn find_membership(
        &self,
        game_id: Uuid,
        player_id: Uuid,
    ) -> Result<Option<GamePlayer>, StoreError>;

    // Turns
    /// The turn with the highest number for the game, if any.
    async fn latest_turn(&self, game_id: Uuid) -> Result<Option<Turn>, StoreError>;

    /// Fails with [`StoreError::DuplicateTurn`] if the (game, number) pair
    /// is already taken.
    async fn insert_turn(
        &self,
        game_id: Uuid,
        game_player_id: i64,
        turn_number: i32,
        state: &serde_json::Value,
    ) -> Result<Turn, StoreError>;
}
