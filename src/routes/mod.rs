pub mod auth;
pub mod games;
pub mod health;
pub mod matchmaking;
pub mod players;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/players", post(players::register))
        .route("/matchmaking/request", post(matchmaking::submit_request))
        .route("/matchmaking/sweep", post(matchmaking::run_sweep))
        .route("/games", get(games::list_games))
        .route("/games/{game_id}", get(games::get_game))
        .route("/games/{game_id}/turns", post(games::post_turn))
}
