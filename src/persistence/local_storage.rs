//! Browser LocalStorage backend

use super::{HighScoreStore, PersistenceError, STORAGE_KEY, parse_score};

/// Stores the high score as an integer string under `kidneyquest_highscore`
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Result<web_sys::Storage, PersistenceError> {
        web_sys::window()
            .ok_or_else(|| PersistenceError::Unavailable("no window".into()))?
            .local_storage()
            .map_err(|e| PersistenceError::Unavailable(format!("{e:?}")))?
            .ok_or_else(|| PersistenceError::Unavailable("localStorage disabled".into()))
    }
}

impl HighScoreStore for LocalStorageStore {
    fn load(&self) -> Result<Option<u64>, PersistenceError> {
        let raw = Self::storage()?
            .get_item(STORAGE_KEY)
            .map_err(|e| PersistenceError::Unavailable(format!("{e:?}")))?;
        raw.as_deref().map(parse_score).transpose()
    }

    fn store(&mut self, score: u64) -> Result<(), PersistenceError> {
        Self::storage()?
            .set_item(STORAGE_KEY, &score.to_string())
            .map_err(|e| PersistenceError::Unavailable(format!("{e:?}")))
    }
}
