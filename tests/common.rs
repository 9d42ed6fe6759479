//! Test utilities & fixtures shared by the integration tests.

use rand::rngs::StdRng;
use rand::SeedableRng;
use textquest::config::{Config, LoggingConfig, StorageConfig};
use textquest::game::{new_game, GameState};
use textquest::server::AppState;

/// Deterministic RNG for combat tests.
#[allow(dead_code)]
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Fresh game for the default hero.
#[allow(dead_code)]
pub fn hero() -> GameState {
    new_game("Hero")
}

/// Config pointing its save directory into `tmp`, with file logging off.
#[allow(dead_code)]
pub fn test_config(tmp: &tempfile::TempDir) -> Config {
    let mut config = Config::default();
    config.storage = StorageConfig {
        save_dir: tmp.path().join("saves").to_string_lossy().into_owned(),
        max_save_bytes: 1024 * 1024,
        io_timeout_secs: 5,
    };
    config.logging = LoggingConfig {
        level: "error".into(),
        file: None,
    };
    config
}

#[allow(dead_code)]
pub async fn app_state() -> (tempfile::TempDir, AppState) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let state = AppState::new(test_config(&tmp)).await.expect("app state");
    (tmp, state)
}
