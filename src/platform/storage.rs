//! Browser LocalStorage backend (wasm only)

use crate::highscores::HighScoreEntry;
use crate::persistence::{ScoreStorage, StorageError, decode_entries};

/// LocalStorage key for the leaderboard
pub const SCORES_KEY: &str = "drag_bounce_highscores";

/// Leaderboard stored under a single LocalStorage key
#[derive(Debug, Clone)]
pub struct LocalStorage {
    key: String,
}

impl LocalStorage {
    pub fn new() -> Self {
        Self::with_key(SCORES_KEY)
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// The window's LocalStorage, if the browser exposes one
pub fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .ok_or_else(|| StorageError::Unavailable("LocalStorage not available".to_string()))
}

impl ScoreStorage for LocalStorage {
    fn load(&self) -> Result<Vec<HighScoreEntry>, StorageError> {
        let storage = local_storage()?;
        match storage.get_item(&self.key) {
            Ok(Some(json)) => decode_entries(&json),
            Ok(None) => Ok(Vec::new()),
            Err(_) => Err(StorageError::Unavailable(format!("cannot read {}", self.key))),
        }
    }

    fn save(&mut self, entries: &[HighScoreEntry]) -> Result<(), StorageError> {
        let storage = local_storage()?;
        let json = serde_json::to_string(entries)?;
        storage
            .set_item(&self.key, &json)
            .map_err(|_| StorageError::Unavailable(format!("cannot write {}", self.key)))
    }
}
