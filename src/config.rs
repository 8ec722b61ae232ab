use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub matchmaking: MatchmakingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchmakingConfig {
    /// Players required before the sweep assembles a game
    pub min_players: u32,
    /// Upper bound carried over from the original deployment; the sweep
    /// does not use it to cap batches
    pub max_players: u32,
    /// Map assigned to assembled games
    pub default_map: String,
    /// Cadence of the background sweep task
    pub sweep_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a number")?,
        };

        let server = ServerConfig {
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
        };

        let security = SecurityConfig {
            jwt_secret: env::var("JWT_SECRET")
                .context("JWT_SECRET must be set")?,
        };

        let matchmaking = MatchmakingConfig {
            min_players: env::var("MATCHMAKING_MIN_PLAYERS")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .context("MATCHMAKING_MIN_PLAYERS must be a number")?,
            max_players: env::var("MATCHMAKING_MAX_PLAYERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .context("MATCHMAKING_MAX_PLAYERS must be a number")?,
            default_map: env::var("MATCHMAKING_DEFAULT_MAP")
                .unwrap_or_else(|_| "Crossroads".to_string()),
            sweep_interval_secs: env::var("MATCHMAKING_SWEEP_INTERVAL_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("MATCHMAKING_SWEEP_INTERVAL_SECONDS must be a number")?,
        };

        Ok(Config {
            database,
            server,
            security,
            matchmaking,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
