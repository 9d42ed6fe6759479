//! # Configuration Management Module
//!
//! Centralized, type-safe configuration for the textquest server, loaded from
//! a TOML file with sensible defaults for every section.
//!
//! ## Configuration Structure
//!
//! - [`ServerConfig`] - HTTP bind address
//! - [`GameConfig`] - New-game defaults and journal size
//! - [`StorageConfig`] - Save directory, size limit and I/O timeout
//! - [`LoggingConfig`] - Log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use textquest::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Listening on {}", config.server.bind);
//!
//!     Config::create_default("config.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//!
//! [game]
//! default_player_name = "Hero"
//! journal_limit = 100
//!
//! [storage]
//! save_dir = "./data/saves"
//! max_save_bytes = 1048576
//! io_timeout_secs = 5
//!
//! [logging]
//! level = "info"
//! file = "textquest.log"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub game: GameConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the HTTP listener binds to.
    pub bind: String,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| anyhow!("Invalid bind address {}: {}", self.bind, e))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Name used when a new game is requested without one (and at startup).
    #[serde(default = "default_player_name")]
    pub default_player_name: String,
    /// Number of recent events kept in the in-memory journal.
    #[serde(default = "default_journal_limit")]
    pub journal_limit: usize,
}

fn default_player_name() -> String {
    "Hero".to_string()
}

fn default_journal_limit() -> usize {
    100
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            default_player_name: default_player_name(),
            journal_limit: default_journal_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub save_dir: String,
    /// Save files larger than this are refused on load.
    #[serde(default = "default_max_save_bytes")]
    pub max_save_bytes: u64,
    /// Upper bound on a single save/load/list/delete before the request fails.
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,
}

fn default_max_save_bytes() -> u64 {
    1024 * 1024
}

fn default_io_timeout_secs() -> u64 {
    5
}

impl StorageConfig {
    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl LoggingConfig {
    /// Parsed level; unknown strings fall back to `Info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.server.socket_addr()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                bind: "127.0.0.1:8080".to_string(),
            },
            game: GameConfig::default(),
            storage: StorageConfig {
                save_dir: "./data/saves".to_string(),
                max_save_bytes: default_max_save_bytes(),
                io_timeout_secs: default_io_timeout_secs(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("textquest.log".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.server.bind, "127.0.0.1:8080");
        assert_eq!(parsed.game.default_player_name, "Hero");
        assert_eq!(parsed.storage.io_timeout_secs, 5);
    }

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let text = r#"
[server]
bind = "0.0.0.0:9000"

[storage]
save_dir = "/tmp/saves"

[logging]
level = "debug"
"#;
        let parsed: Config = toml::from_str(text).unwrap();
        assert_eq!(parsed.game.journal_limit, 100);
        assert_eq!(parsed.storage.max_save_bytes, 1024 * 1024);
        assert_eq!(parsed.logging.level_filter(), log::LevelFilter::Debug);
        assert!(parsed.logging.file.is_none());
        assert_eq!(parsed.server.socket_addr().unwrap().port(), 9000);
    }

    #[test]
    fn bad_level_defaults_to_info() {
        let logging = LoggingConfig {
            level: "chatty".to_string(),
            file: None,
        };
        assert_eq!(logging.level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn bad_bind_address_is_rejected() {
        let server = ServerConfig {
            bind: "not-an-address".to_string(),
        };
        assert!(server.socket_addr().is_err());
    }
}
