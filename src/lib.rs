//! # textquest - Text Adventure Game Server
//!
//! textquest runs a single-player text adventure behind a small JSON-over-HTTP
//! API. A player walks a graph of locations, fights the enemies found there,
//! picks up items and saves or restores progress.
//!
//! ## Features
//!
//! - **Pure game core**: every transition borrows a [`game::GameState`] and returns a new one.
//! - **Combat**: `max(1, attack - defense/2 ± 3)` damage with counter-attacks and experience.
//! - **Movement**: one hop along directed exits, with the reason when a move is refused.
//! - **Saves**: checksummed JSON snapshots written atomically under a file lock.
//! - **Lore**: a searchable book of entries about the world's places and creatures.
//! - **HTTP API**: axum on Tokio, with request ids, journal and counters.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use textquest::config::Config;
//! use textquest::server::GameServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let server = GameServer::new(config).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - World data, combat, movement, inventory, dice and lore
//! - [`server`] - Session cell, HTTP routes and middleware
//! - [`storage`] - Save file persistence
//! - [`config`] - Configuration loading
//! - [`validation`] - Request validation
//! - [`metrics`] - Process-wide counters
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HTTP Routes   │ ← Validation, status mapping
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   GameSession   │ ← RwLock around the current snapshot
//! └─────────────────┘
//!          │
//! ┌─────────────────┐     ┌─────────────────┐
//! │   Game Core     │     │   SaveStore     │ ← JSON files on disk
//! └─────────────────┘     └─────────────────┘
//! ```

pub mod config;
pub mod game;
pub mod logutil;
pub mod metrics;
pub mod server;
pub mod storage;
pub mod validation;
