mod access;
mod assembly;
mod auth;
mod config;
mod directory;
mod error;
mod ledger;
mod matchmaking;
mod models;
mod routes;
mod store;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use axum::Router;
use config::Config;
use matchmaking::SweepOutcome;
use store::postgres::PgStore;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub store: PgStore,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wargame_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting wargame backend server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        "Configuration loaded (matchmaking: min_players={}, max_players={}, map={})",
        config.matchmaking.min_players,
        config.matchmaking.max_players,
        config.matchmaking.default_map
    );

    // Connect to database
    let pool = store::create_pool(config.database_url(), config.database.max_connections).await?;
    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create application state
    let state = Arc::new(AppState {
        config: config.clone(),
        store: PgStore::new(pool),
    });

    // Spawn the periodic matchmaking sweep
    let sweep_state = state.clone();
    tokio::spawn(async move {
        matchmaking_sweep_task(sweep_state).await;
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .merge(routes::create_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Background task that periodically runs the matchmaking sweep.
///
/// The sweep is also exposed as an HTTP trigger; both paths invoke the same
/// operation and are safe to race thanks to the store's batch semantics.
async fn matchmaking_sweep_task(state: Arc<AppState>) {
    let mut interval =
        tokio::time::interval(Duration::from_secs(state.config.matchmaking.sweep_interval_secs));

    loop {
        interval.tick().await;

        match matchmaking::sweep(&state.store, &state.config.matchmaking).await {
            Ok(SweepOutcome::GameCreated { game, player_count }) => {
                tracing::info!(
                    "Sweep created game '{}' ({}) with {} players",
                    game.name,
                    game.game_id,
                    player_count
                );
            }
            Ok(SweepOutcome::NotEnoughPlayers { queued, needed }) => {
                tracing::debug!("Sweep: {} of {} players queued", queued, needed);
            }
            Err(e) => {
                tracing::error!("Matchmaking sweep failed: {}", e);
            }
        }
    }
}
