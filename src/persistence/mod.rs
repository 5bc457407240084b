//! High score storage backends
//!
//! - `MemoryStore`: process-local, used by tests and as a fallback
//! - `JsonFileStore`: native, `{"high_score": n}` on disk
//! - `LocalStorageStore`: browser LocalStorage (wasm32 only)

#[cfg(target_arch = "wasm32")]
mod local_storage;

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// LocalStorage key shared with the web build
pub const STORAGE_KEY: &str = "kidneyquest_highscore";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("high score file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("high score file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stored high score {0:?} is not an integer")]
    Corrupt(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Read/write contract for the single persisted high score
pub trait HighScoreStore {
    /// `Ok(None)` when nothing has been stored yet
    fn load(&self) -> Result<Option<u64>, PersistenceError>;
    fn store(&mut self, score: u64) -> Result<(), PersistenceError>;
}

/// Parse the integer-string form used by key/value stores
pub(crate) fn parse_score(raw: &str) -> Result<u64, PersistenceError> {
    raw.trim()
        .parse()
        .map_err(|_| PersistenceError::Corrupt(raw.to_string()))
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(score: u64) -> Self {
        Self { value: Some(score) }
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<Option<u64>, PersistenceError> {
        Ok(self.value)
    }

    fn store(&mut self, score: u64) -> Result<(), PersistenceError> {
        self.value = Some(score);
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct HighScoreFile {
    high_score: u64,
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for JsonFileStore {
    fn load(&self) -> Result<Option<u64>, PersistenceError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let file: HighScoreFile = serde_json::from_str(&json)?;
        Ok(Some(file.high_score))
    }

    fn store(&mut self, score: u64) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(&HighScoreFile { high_score: score })?;
        // Write to a sibling then rename so a crash never leaves half a file
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
