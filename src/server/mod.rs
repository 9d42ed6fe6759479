//! # Game Server
//!
//! [`GameServer`] wires configuration, the save store and the live
//! [`GameSession`] into an axum router and serves it until Ctrl-C.
//!
//! ```rust,no_run
//! use textquest::config::Config;
//! use textquest::server::GameServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let server = GameServer::new(config).await?;
//!     server.run().await
//! }
//! ```

pub mod request_id;
pub mod routes;
pub mod session;

use anyhow::{anyhow, Result};
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use log::info;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::game::{default_lore, new_game, LoreBook};
use crate::storage::SaveStore;
use crate::validation::{validate_player_name, NameRules};

pub use routes::ApiError;
pub use session::{GameSession, JournalEntry};

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<GameSession>,
    pub store: SaveStore,
    pub config: Arc<Config>,
    pub name_rules: Arc<NameRules>,
    pub lore: Arc<RwLock<LoreBook>>,
}

impl AppState {
    /// Fresh game for the configured default player.
    pub async fn new(config: Config) -> Result<Self> {
        let name_rules = NameRules::default();
        let player_name = validate_player_name(&config.game.default_player_name, &name_rules)
            .map_err(|e| anyhow!("Invalid default_player_name: {}", e))?;
        let store = SaveStore::new(&config.storage.save_dir, config.storage.max_save_bytes).await?;
        let session = GameSession::new(new_game(&player_name), config.game.journal_limit);
        Ok(Self {
            session: Arc::new(session),
            store,
            config: Arc::new(config),
            name_rules: Arc::new(name_rules),
            lore: Arc::new(RwLock::new(default_lore())),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/game/new", post(routes::new_game))
        .route("/api/game/state", get(routes::game_state))
        .route("/api/command", post(routes::command))
        .route("/api/move", post(routes::move_player))
        .route("/api/attack", post(routes::attack))
        .route("/api/take", post(routes::take))
        .route("/api/drop", post(routes::drop_item))
        .route("/api/look", get(routes::look))
        .route("/api/player/stats", get(routes::player_stats))
        .route("/api/player/inventory", get(routes::player_inventory))
        .route("/api/dice/roll", post(routes::dice_roll))
        .route("/api/journal", get(routes::journal))
        .route("/api/lore", get(routes::lore).post(routes::add_lore))
        .route("/api/metrics", get(routes::metrics_snapshot))
        .route("/api/saves", get(routes::list_saves).post(routes::create_save))
        .route("/api/saves/:id/load", post(routes::load_save))
        .route("/api/saves/:id", delete(routes::delete_save))
        .layer(middleware::from_fn(request_id::request_id))
        .with_state(state)
}

pub struct GameServer {
    state: AppState,
}

impl GameServer {
    pub async fn new(config: Config) -> Result<Self> {
        Ok(Self {
            state: AppState::new(config).await?,
        })
    }

    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Bind the configured address and serve until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.server.socket_addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| anyhow!("Failed to bind {}: {}", addr, e))?;
        info!(
            "textquest v{} listening on {}",
            env!("CARGO_PKG_VERSION"),
            listener.local_addr()?
        );
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Server stopped");
        Ok(())
    }

    pub async fn show_status(&self) -> Result<()> {
        let config = &self.state.config;
        let saves = self.state.store.list().await?;
        println!("=== textquest Status ===");
        println!("Bind Address: {}", config.server.bind);
        println!("Default Player: {}", config.game.default_player_name);
        println!("Save Directory: {}", self.state.store.dir().display());
        println!("Saved Games: {}", saves.len());
        if let Some(latest) = saves.first() {
            println!(
                "Latest Save: {} ({}, level {}, {})",
                latest.id,
                latest.player_name,
                latest.level,
                latest.saved_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
