//! In-memory record store for unit tests.
//!
//! Honors the same contract as the Postgres store: per-player request
//! uniqueness, (game, turn_number) uniqueness, FIFO request ordering, and
//! all-or-nothing assembly batches. A single mutex over the whole state
//! makes every operation atomic.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::{Game, GameMap, GamePlayer, GameRequest, Player, Turn};
use crate::store::{NewMembership, QueuedRequest, RecordStore, StoreError};

#[derive(Default)]
struct MemInner {
    players: Vec<Player>,
    requests: Vec<GameRequest>,
    maps: Vec<GameMap>,
    games: Vec<Game>,
    memberships: Vec<GamePlayer>,
    turns: Vec<Turn>,
    next_request_id: i64,
    next_membership_id: i64,
    next_turn_id: i64,
}

#[derive(Clone, Default)]
pub struct MemStore {
    inner: Arc<Mutex<MemInner>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a map directly, as the migration seed would.
    pub fn seed_map(&self, name: &str, width: i32, height: i32) -> GameMap {
        let map = GameMap {
            map_id: Uuid::new_v4(),
            name: name.to_string(),
            width,
            height,
        };
        self.inner.lock().unwrap().maps.push(map.clone());
        map
    }

    pub fn request_count(&self) -> usize {
        self.inner.lock().unwrap().requests.len()
    }

    pub fn game_count(&self) -> usize {
        self.inner.lock().unwrap().games.len()
    }

    pub fn membership_count(&self) -> usize {
        self.inner.lock().unwrap().memberships.len()
    }

    pub fn turn_count(&self) -> usize {
        self.inner.lock().unwrap().turns.len()
    }
}

#[async_trait]
impl RecordStore for MemStore {
    async fn find_player_by_user(&self, user_id: i64) -> Result<Option<Player>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.players.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn ensure_player(&self, user_id: i64, display_name: &str) -> Result<Player, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        // Players are immutable once created; conflicts return the row as is
        if let Some(existing) = inner.players.iter().find(|p| p.user_id == user_id) {
            return Ok(existing.clone());
        }
        let player = Player {
            player_id: Uuid::new_v4(),
            user_id,
            display_name: display_name.to_string(),
            created_at: Utc::now(),
        };
        inner.players.push(player.clone());
        Ok(player)
    }

    async fn find_request_for_player(
        &self,
        player_id: Uuid,
    ) -> Result<Option<GameRequest>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .requests
            .iter()
            .find(|r| r.player_id == player_id)
            .cloned())
    }

    async fn create_request(&self, player_id: Uuid) -> Result<GameRequest, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.requests.iter().any(|r| r.player_id == player_id) {
            return Err(StoreError::RequestExists);
        }
        inner.next_request_id += 1;
        let request = GameRequest {
            id: inner.next_request_id,
            player_id,
            created_at: Utc::now(),
        };
        inner.requests.push(request.clone());
        Ok(request)
    }

    async fn oldest_requests(&self, limit: i64) -> Result<Vec<QueuedRequest>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut sorted: Vec<&GameRequest> = inner.requests.iter().collect();
        sorted.sort_by_key(|r| (r.created_at, r.id));

        let mut queued = Vec::new();
        for request in sorted.into_iter().take(limit as usize) {
            let player = inner
                .players
                .iter()
                .find(|p| p.player_id == request.player_id)
                .cloned()
                .ok_or_else(|| {
                    StoreError::Inconsistent(format!(
                        "request {} references missing player {}",
                        request.id, request.player_id
                    ))
                })?;
            queued.push(QueuedRequest {
                request: request.clone(),
                player,
            });
        }
        Ok(queued)
    }

    async fn find_map(&self, map_id: Uuid) -> Result<Option<GameMap>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.maps.iter().find(|m| m.map_id == map_id).cloned())
    }

    async fn find_map_by_name(&self, name: &str) -> Result<Option<GameMap>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.maps.iter().find(|m| m.name == name).cloned())
    }

    async fn commit_assembly(
        &self,
        name: &str,
        map_id: Uuid,
        members: &[NewMembership],
        consumed_request_ids: &[i64],
    ) -> Result<Game, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        // Batch-or-nothing: verify every consumed request still exists
        // before mutating anything
        let all_present = consumed_request_ids
            .iter()
            .all(|id| inner.requests.iter().any(|r| r.id == *id));
        if !all_present {
            return Err(StoreError::RequestsClaimed);
        }

        let game = Game {
            game_id: Uuid::new_v4(),
            name: name.to_string(),
            map_id,
            created_at: Utc::now(),
        };
        inner.games.push(game.clone());

        for member in members {
            inner.next_membership_id += 1;
            let id = inner.next_membership_id;
            inner.memberships.push(GamePlayer {
                id,
                game_id: game.game_id,
                player_id: member.player_id,
                turn_order: member.turn_order,
                joined_at: Utc::now(),
            });
        }

        inner
            .requests
            .retain(|r| !consumed_request_ids.contains(&r.id));

        Ok(game)
    }

    async fn find_game(&self, game_id: Uuid) -> Result<Option<Game>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.games.iter().find(|g| g.game_id == game_id).cloned())
    }

    async fn games_for_player(&self, player_id: Uuid) -> Result<Vec<Game>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut games: Vec<Game> = inner
            .memberships
            .iter()
            .filter(|m| m.player_id == player_id)
            .filter_map(|m| inner.games.iter().find(|g| g.game_id == m.game_id))
            .cloned()
            .collect();
        games.sort_by_key(|g| (g.created_at, g.game_id));
        Ok(games)
    }

    async fn find_membership(
        &self,
        game_id: Uuid,
        player_id: Uuid,
    ) -> Result<Option<GamePlayer>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .memberships
            .iter()
            .find(|m| m.game_id == game_id && m.player_id == player_id)
            .cloned())
    }

    async fn latest_turn(&self, game_id: Uuid) -> Result<Option<Turn>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .turns
            .iter()
            .filter(|t| t.game_id == game_id)
            .max_by_key(|t| t.turn_number)
            .cloned())
    }

    async fn insert_turn(
        &self,
        game_id: Uuid,
        game_player_id: i64,
        turn_number: i32,
        state: &serde_json::Value,
    ) -> Result<Turn, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .turns
            .iter()
            .any(|t| t.game_id == game_id && t.turn_number == turn_number)
        {
            return Err(StoreError::DuplicateTurn {
                game_id,
                number: turn_number,
            });
        }
        inner.next_turn_id += 1;
        let turn = Turn {
            id: inner.next_turn_id,
            game_id,
            game_player_id,
            turn_number,
            state: state.clone(),
            created_at: Utc::now(),
        };
        inner.turns.push(turn.clone());
        Ok(turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_request_rejects_second_request_for_player() {
        let store = MemStore::new();
        let player = store.ensure_player(1, "Alice").await.unwrap();

        store.create_request(player.player_id).await.unwrap();
        let second = store.create_request(player.player_id).await;

        assert!(matches!(second, Err(StoreError::RequestExists)));
        assert_eq!(store.request_count(), 1, "only one request should persist");
    }

    #[tokio::test]
    async fn test_oldest_requests_returns_fifo_order() {
        let store = MemStore::new();
        let alice = store.ensure_player(1, "Alice").await.unwrap();
        let bob = store.ensure_player(2, "Bob").await.unwrap();
        let carol = store.ensure_player(3, "Carol").await.unwrap();

        store.create_request(alice.player_id).await.unwrap();
        store.create_request(bob.player_id).await.unwrap();
        store.create_request(carol.player_id).await.unwrap();

        let queued = store.oldest_requests(2).await.unwrap();
        assert_eq!(queued.len(), 2);
        assert_eq!(queued[0].player.display_name, "Alice");
        assert_eq!(queued[1].player.display_name, "Bob");
    }

    #[tokio::test]
    async fn test_commit_assembly_fails_when_request_already_consumed() {
        let store = MemStore::new();
        let map = store.seed_map("Crossroads", 16, 12);
        let alice = store.ensure_player(1, "Alice").await.unwrap();
        let request = store.create_request(alice.player_id).await.unwrap();

        let members = vec![NewMembership {
            player_id: alice.player_id,
            turn_order: 0,
        }];

        store
            .commit_assembly("Alice", map.map_id, &members, &[request.id])
            .await
            .unwrap();

        // Second commit against the same (now deleted) request must not
        // create anything
        let second = store
            .commit_assembly("Alice", map.map_id, &members, &[request.id])
            .await;

        assert!(matches!(second, Err(StoreError::RequestsClaimed)));
        assert_eq!(store.game_count(), 1);
        assert_eq!(store.membership_count(), 1);
    }

    #[tokio::test]
    async fn test_insert_turn_rejects_duplicate_number() {
        let store = MemStore::new();
        let game_id = Uuid::new_v4();

        store
            .insert_turn(game_id, 1, 1, &json!({"units": 4}))
            .await
            .unwrap();
        let duplicate = store.insert_turn(game_id, 2, 1, &json!({"units": 5})).await;

        assert!(matches!(
            duplicate,
            Err(StoreError::DuplicateTurn { number: 1, .. })
        ));
        assert_eq!(store.turn_count(), 1);
    }

    #[tokio::test]
    async fn test_insert_turn_allows_same_number_on_different_games() {
        let store = MemStore::new();
        let game_a = Uuid::new_v4();
        let game_b = Uuid::new_v4();

        store.insert_turn(game_a, 1, 1, &json!({})).await.unwrap();
        store.insert_turn(game_b, 2, 1, &json!({})).await.unwrap();

        assert_eq!(store.turn_count(), 2);
    }

    #[tokio::test]
    async fn test_ensure_player_is_idempotent() {
        let store = MemStore::new();
        let first = store.ensure_player(1, "Alice").await.unwrap();
        let second = store.ensure_player(1, "Alice").await.unwrap();

        assert_eq!(first.player_id, second.player_id);
    }

    #[tokio::test]
    async fn test_ensure_player_keeps_existing_record_unchanged() {
        let store = MemStore::new();
        store.ensure_player(1, "Alice").await.unwrap();

        let repeat = store.ensure_player(1, "Alicia").await.unwrap();
        assert_eq!(repeat.display_name, "Alice");

        let stored = store.find_player_by_user(1).await.unwrap().unwrap();
        assert_eq!(stored.display_name, "Alice");
    }
}
