use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A pending matchmaking ticket. At most one exists per player at any time;
/// the sweep consumes the oldest tickets first, ordered by `created_at` with
/// the store-assigned `id` as tie-break.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GameRequest {
    pub id: i64,
    pub player_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// The map resource a game is played on.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GameMap {
    pub map_id: Uuid,
    pub name: String,
    pub width: i32,
    pub height: i32,
}

/// An assembled match. The name is the member display names joined in
/// request order. Created atomically with its memberships; never partially
/// visible.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Game {
    pub game_id: Uuid,
    pub name: String,
    pub map_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Membership record joining one player to one game. This is the sole basis
/// for access control: no membership row, no access.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GamePlayer {
    pub id: i64,
    pub game_id: Uuid,
    pub player_id: Uuid,
    /// Position in the original request batch (0-based)
    pub turn_order: i32,
    pub joined_at: DateTime<Utc>,
}

/// An immutable snapshot of game state. Turn numbers for a game form a
/// contiguous sequence starting at 1; the state payload is opaque to the
/// service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Turn {
    pub id: i64,
    pub game_id: Uuid,
    /// The membership that submitted this turn
    pub game_player_id: i64,
    pub turn_number: i32,
    pub state: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
