//! Persisted best score
//!
//! Wraps a `HighScoreStore` so the game never sees storage errors: failures
//! are logged and the book keeps working from its in-memory value.

use crate::persistence::HighScoreStore;

pub struct HighScoreBook {
    store: Box<dyn HighScoreStore>,
    cached: u64,
}

impl HighScoreBook {
    pub fn new(store: Box<dyn HighScoreStore>) -> Self {
        let mut book = Self { store, cached: 0 };
        book.cached = book.load_high_score();
        book
    }

    /// Stored high score, or 0 if none is stored or it cannot be read
    pub fn load_high_score(&mut self) -> u64 {
        match self.store.load() {
            Ok(Some(score)) => {
                self.cached = self.cached.max(score);
                score
            }
            Ok(None) => 0,
            Err(e) => {
                log::warn!("Failed to load high score: {e}");
                0
            }
        }
    }

    /// Best score seen this process, including anything loaded
    pub fn best(&self) -> u64 {
        self.cached
    }

    /// Persist `candidate` if it beats the best score. Returns whether it did.
    ///
    /// A failed write is logged; the new best is still kept in memory.
    pub fn save_high_score_if_greater(&mut self, candidate: u64) -> bool {
        if candidate <= self.cached {
            return false;
        }
        self.cached = candidate;
        if let Err(e) = self.store.store(candidate) {
            log::warn!("Failed to save high score {candidate}: {e}");
        } else {
            log::info!("New high score: {candidate}");
        }
        true
    }
}

impl std::fmt::Debug for HighScoreBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighScoreBook").field("best", &self.cached).finish()
    }
}
