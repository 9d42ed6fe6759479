//! # Storage Module - Save Game Persistence
//!
//! Whole-snapshot persistence for [`GameState`]. Each save is one JSON file
//! named after its UUID:
//!
//! ```text
//! data/saves/
//! ├── .saves.lock                                ← fs2 lock shared by all writers
//! ├── 0b6d1c9e-4d5f-4a8e-9a62-1b8f0f4b2c11.json
//! └── 7f3e...-....json
//! ```
//!
//! A file holds a [`SaveFile`] envelope carrying a format version, a save
//! timestamp and a SHA-256 checksum of the canonical JSON of the state.
//! Loading refuses anything that fails one of those checks, as well as a
//! state whose player stands in a location that does not exist.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use textquest::game::new_game;
//! use textquest::storage::SaveStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = SaveStore::new("./data/saves", 1024 * 1024).await?;
//!     let summary = store.save(&new_game("Hero")).await?;
//!     let restored = store.load(&summary.id).await?;
//!     assert_eq!(restored.player.name, "Hero");
//!     Ok(())
//! }
//! ```
//!
//! Writes go to a temporary file which is synced and renamed over the
//! target, so readers only ever see complete saves.

use chrono::{DateTime, Utc};
use fs2::FileExt;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::game::{GameError, GameState};
use crate::validation::{validate_save_id, ValidationError};

/// Envelope version written by this build.
pub const SAVE_FORMAT_VERSION: u32 = 1;

const LOCK_FILE_NAME: &str = ".saves.lock";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed save file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("save '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    InvalidId(#[from] ValidationError),

    #[error("save file is {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    #[error("checksum mismatch in save '{0}'")]
    ChecksumMismatch(String),

    #[error("unsupported save format version {0}")]
    UnsupportedVersion(u32),

    #[error(transparent)]
    InvalidState(#[from] GameError),

    #[error("storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// On-disk representation of one save.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFile {
    pub version: u32,
    pub id: String,
    pub saved_at: DateTime<Utc>,
    pub checksum: String,
    pub state: GameState,
}

/// What listing a save reveals without handing out the whole state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SaveSummary {
    pub id: String,
    pub saved_at: DateTime<Utc>,
    pub player_name: String,
    pub level: u32,
    pub location: String,
}

impl From<&SaveFile> for SaveSummary {
    fn from(file: &SaveFile) -> Self {
        Self {
            id: file.id.clone(),
            saved_at: file.saved_at,
            player_name: file.state.player.name.clone(),
            level: file.state.player.stats.level,
            location: file.state.player.current_location.clone(),
        }
    }
}

/// Hex SHA-256 of the canonical JSON encoding of `state`.
pub fn state_checksum(state: &GameState) -> Result<String, StorageError> {
    let bytes = serde_json::to_vec(state)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Directory of save files.
#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
    max_bytes: u64,
}

impl SaveStore {
    /// Open (creating if needed) the save directory.
    pub async fn new(dir: impl AsRef<Path>, max_bytes: u64) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir, max_bytes })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist `state` under a fresh id. Returns once the file is durable.
    pub async fn save(&self, state: &GameState) -> Result<SaveSummary, StorageError> {
        let file = SaveFile {
            version: SAVE_FORMAT_VERSION,
            id: Uuid::new_v4().to_string(),
            saved_at: Utc::now(),
            checksum: state_checksum(state)?,
            state: state.clone(),
        };
        let content = serde_json::to_string_pretty(&file)?;
        let size = content.len();
        let summary = SaveSummary::from(&file);
        let path = self.path_for(&file.id);
        let lock = self.lock_path();
        tokio::task::spawn_blocking(move || write_json_atomic(&lock, &path, &content)).await??;
        debug!("saved game {} ({} bytes)", summary.id, size);
        Ok(summary)
    }

    /// Read and verify a save. The returned state has passed `GameState::validate`.
    pub async fn load(&self, id: &str) -> Result<GameState, StorageError> {
        let id = validate_save_id(id)?;
        let path = self.path_for(&id);
        let lock = self.lock_path();
        let max_bytes = self.max_bytes;
        let file = tokio::task::spawn_blocking(move || -> Result<SaveFile, StorageError> {
            let _guard = lock_shared(&lock)?;
            read_save_file(&path, &id, max_bytes)
        })
        .await??;
        Ok(file.state)
    }

    /// All readable saves, newest first. Unreadable files are logged and skipped.
    pub async fn list(&self) -> Result<Vec<SaveSummary>, StorageError> {
        let dir = self.dir.clone();
        let lock = self.lock_path();
        let max_bytes = self.max_bytes;
        tokio::task::spawn_blocking(move || -> Result<Vec<SaveSummary>, StorageError> {
            let _guard = lock_shared(&lock)?;
            let mut summaries = Vec::new();
            for entry in std::fs::read_dir(&dir)? {
                let path = entry?.path();
                let Some(id) = save_id_from_path(&path) else {
                    continue;
                };
                match read_save_file(&path, &id, max_bytes) {
                    Ok(file) => summaries.push(SaveSummary::from(&file)),
                    Err(e) => warn!("skipping unreadable save {}: {}", path.display(), e),
                }
            }
            summaries.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then_with(|| a.id.cmp(&b.id)));
            Ok(summaries)
        })
        .await?
    }

    pub async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let id = validate_save_id(id)?;
        let path = self.path_for(&id);
        let lock = self.lock_path();
        tokio::task::spawn_blocking(move || -> Result<(), StorageError> {
            let guard = open_lock(&lock)?;
            guard.lock_exclusive()?;
            match std::fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(id)),
                Err(e) => Err(e.into()),
            }
        })
        .await?
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE_NAME)
    }
}

fn save_id_from_path(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    validate_save_id(stem).ok()
}

fn open_lock(lock_path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(lock_path)
}

fn lock_shared(lock_path: &Path) -> std::io::Result<File> {
    let file = open_lock(lock_path)?;
    file.lock_shared()?;
    Ok(file)
}

fn read_save_file(path: &Path, id: &str, max_bytes: u64) -> Result<SaveFile, StorageError> {
    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StorageError::NotFound(id.to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    if size > max_bytes {
        return Err(StorageError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let bytes = std::fs::read(path)?;
    let file: SaveFile = serde_json::from_slice(&bytes)?;
    if file.version != SAVE_FORMAT_VERSION {
        return Err(StorageError::UnsupportedVersion(file.version));
    }
    if state_checksum(&file.state)? != file.checksum {
        return Err(StorageError::ChecksumMismatch(id.to_string()));
    }
    file.state.validate()?;
    Ok(file)
}

/// Write `content` to `path` via temp file + rename while holding an
/// exclusive lock on `lock_path`.
fn write_json_atomic(lock_path: &Path, path: &Path, content: &str) -> Result<(), StorageError> {
    let dir = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)?;
    let lock_file = open_lock(lock_path)?;
    lock_file.lock_exclusive()?;

    let base = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("save.json");
    let mut counter = 0u32;
    let tmp_path = loop {
        let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut tmp) => {
                tmp.write_all(content.as_bytes())?;
                tmp.flush()?;
                tmp.sync_all()?;
                break candidate;
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                counter = counter.saturating_add(1);
            }
            Err(e) => return Err(e.into()),
        }
    };
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    if let Ok(dirf) = File::open(dir) {
        let _ = dirf.sync_all();
    }
    drop(lock_file);
    Ok(())
}
