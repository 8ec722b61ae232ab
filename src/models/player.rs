use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A player record, bound one-to-one to an authenticated user identity.
///
/// Created once at registration and immutable afterwards as far as this
/// service is concerned.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Player {
    pub player_id: Uuid,
    /// The underlying user identity this player is bound to
    pub user_id: i64,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}
