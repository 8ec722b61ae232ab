use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Game, GameMap, GamePlayer, GameRequest, Player, Turn};
use crate::store::{NewMembership, QueuedRequest, RecordStore, StoreError};

/// Postgres-backed record store.
///
/// Uniqueness invariants (one request per player, one turn number per game)
/// are enforced by the schema's unique constraints; batch atomicity by
/// transactions.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Postgres unique_violation
const UNIQUE_VIOLATION: &str = "23505";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION))
}

#[async_trait]
impl RecordStore for PgStore {
    async fn find_player_by_user(&self, user_id: i64) -> Result<Option<Player>, StoreError> {
        let player = sqlx::query_as::<_, Player>("SELECT * FROM players WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(player)
    }

    async fn ensure_player(&self, user_id: i64, display_name: &str) -> Result<Player, StoreError> {
        // Players are immutable once created: the no-op update only makes
        // RETURNING yield the existing row on conflict
        let player = sqlx::query_as::<_, Player>(
            r#"
            INSERT INTO players (player_id, user_id, display_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(player)
    }

    async fn find_request_for_player(
        &self,
        player_id: Uuid,
    ) -> Result<Option<GameRequest>, StoreError> {
        let request =
            sqlx::query_as::<_, GameRequest>("SELECT * FROM game_requests WHERE player_id = $1")
                .bind(player_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(request)
    }

    async fn create_request(&self, player_id: Uuid) -> Result<GameRequest, StoreError> {
        let result = sqlx::query_as::<_, GameRequest>(
            r#"
            INSERT INTO game_requests (player_id)
            VALUES ($1)
            RETURNING *
            "#,
        )
        .bind(player_id)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(request) => Ok(request),
            Err(e) if is_unique_violation(&e) => Err(StoreError::RequestExists),
            Err(e) => Err(e.into()),
        }
    }

    async fn oldest_requests(&self, limit: i64) -> Result<Vec<QueuedRequest>, StoreError> {
        let requests = sqlx::query_as::<_, GameRequest>(
            "SELECT * FROM game_requests ORDER BY created_at, id LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        // Join each request with its player, preserving FIFO order
        let mut queued = Vec::with_capacity(requests.len());
        for request in requests {
            let player = sqlx::query_as::<_, Player>("SELECT * FROM players WHERE player_id = $1")
                .bind(request.player_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| {
                    StoreError::Inconsistent(format!(
                        "request {} references missing player {}",
                        request.id, request.player_id
                    ))
                })?;
            queued.push(QueuedRequest { request, player });
        }

        Ok(queued)
    }

    async fn find_map(&self, map_id: Uuid) -> Result<Option<GameMap>, StoreError> {
        let map = sqlx::query_as::<_, GameMap>("SELECT * FROM maps WHERE map_id = $1")
            .bind(map_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(map)
    }

    async fn find_map_by_name(&self, name: &str) -> Result<Option<GameMap>, StoreError> {
        let map = sqlx::query_as::<_, GameMap>("SELECT * FROM maps WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(map)
    }

    async fn commit_assembly(
        &self,
        name: &str,
        map_id: Uuid,
        members: &[NewMembership],
        consumed_request_ids: &[i64],
    ) -> Result<Game, StoreError> {
        let mut tx = self.pool.begin().await?;

        let game = sqlx::query_as::<_, Game>(
            r#"
            INSERT INTO games (game_id, name, map_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(map_id)
        .fetch_one(&mut *tx)
        .await?;

        for member in members {
            sqlx::query(
                r#"
                INSERT INTO game_players (game_id, player_id, turn_order)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(game.game_id)
            .bind(member.player_id)
            .bind(member.turn_order)
            .execute(&mut *tx)
            .await?;
        }

        // Delete-if-unmodified: if another sweep already consumed any of
        // these requests the count comes up short and the batch rolls back
        let deleted = sqlx::query("DELETE FROM game_requests WHERE id = ANY($1)")
            .bind(consumed_request_ids)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted != consumed_request_ids.len() as u64 {
            tx.rollback().await?;
            return Err(StoreError::RequestsClaimed);
        }

        tx.commit().await?;
        Ok(game)
    }

    async fn find_game(&self, game_id: Uuid) -> Result<Option<Game>, StoreError> {
        let game = sqlx::query_as::<_, Game>("SELECT * FROM games WHERE game_id = $1")
            .bind(game_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(game)
    }

    async fn games_for_player(&self, player_id: Uuid) -> Result<Vec<Game>, StoreError> {
        let games = sqlx::query_as::<_, Game>(
            r#"
            SELECT g.* FROM games g
            JOIN game_players gp ON gp.game_id = g.game_id
            WHERE gp.player_id = $1
            ORDER BY g.created_at, g.game_id
            "#,
        )
        .bind(player_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(games)
    }

    async fn find_membership(
        &self,
        game_id: Uuid,
        player_id: Uuid,
    ) -> Result<Option<GamePlayer>, StoreError> {
        let membership = sqlx::query_as::<_, GamePlayer>(
            "SELECT * FROM game_players WHERE game_id = $1 AND player_id = $2",
        )
        .bind(game_id)
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(membership)
    }

    async fn latest_turn(&self, game_id: Uuid) -> Result<Option<Turn>, StoreError> {
        let turn = sqlx::query_as::<_, Turn>(
            "SELECT * FROM turns WHERE game_id = $1 ORDER BY turn_number DESC LIMIT 1",
        )
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(turn)
    }

    async fn insert_turn(
        &self,
        game_id: Uuid,
        game_player_id: i64,
        turn_number: i32,
        state: &serde_json::Value,
    ) -> Result<Turn, StoreError> {
        let result = sqlx::query_as::<_, Turn>(
            r#"
            INSERT INTO turns (game_id, game_player_id, turn_number, state)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(game_id)
        .bind(game_player_id)
        .bind(turn_number)
        .bind(state)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(turn) => Ok(turn),
            Err(e) if is_unique_violation(&e) => Err(StoreError::DuplicateTurn {
                game_id,
                number: turn_number,
            }),
            Err(e) => Err(e.into()),
        }
    }
}
