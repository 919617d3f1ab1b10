//! Leaderboard persistence
//!
//! The core only knows the [`ScoreStorage`] collaborator. Backends:
//! - [`MemoryStorage`]: in-process, used by tests and headless runs
//! - [`JsonFileStorage`]: JSON file on disk (native only)
//! - `platform::LocalStorage`: browser LocalStorage (wasm only)
//!
//! Failures are reported as [`StorageError`]; callers log and fall back.

use thiserror::Error;

use crate::highscores::HighScoreEntry;

/// Why a load or save failed
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored scores are not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Decode a stored leaderboard
///
/// The outer array must be valid JSON; entries that do not decode are skipped
/// so one stale record cannot wipe the whole board.
pub fn decode_entries(json: &str) -> Result<Vec<HighScoreEntry>, StorageError> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let total = raw.len();
    let entries: Vec<HighScoreEntry> = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable high score entry: {e}");
                None
            }
        })
        .collect();
    if entries.len() < total {
        log::warn!("Kept {} of {} stored high scores", entries.len(), total);
    }
    Ok(entries)
}

/// Opaque key-value storage for the leaderboard
pub trait ScoreStorage {
    /// Load the stored entries (empty when nothing has been saved yet)
    fn load(&self) -> Result<Vec<HighScoreEntry>, StorageError>;
    /// Replace the stored entries
    fn save(&mut self, entries: &[HighScoreEntry]) -> Result<(), StorageError>;
}

/// Stores the serialized JSON in memory
///
/// Keeping the serialized form (instead of the entries) means tests exercise
/// the same encode/decode path as the real backends, including corruption.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    json: Option<String>,
    /// Number of successful saves
    pub saves: usize,
    /// Make the next saves fail (simulates a full/blocked store)
    pub fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with raw contents (may be garbage)
    pub fn with_raw(json: impl Into<String>) -> Self {
        Self {
            json: Some(json.into()),
            ..Self::default()
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.json.as_deref()
    }
}

impl ScoreStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<HighScoreEntry>, StorageError> {
        match &self.json {
            Some(json) => decode_entries(json),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, entries: &[HighScoreEntry]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        self.json = Some(serde_json::to_string(entries)?);
        self.saves += 1;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::fs;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use super::{ScoreStorage, StorageError};
    use crate::highscores::HighScoreEntry;

    /// Leaderboard stored as a JSON array in a single file
    #[derive(Debug, Clone)]
    pub struct JsonFileStorage {
        path: PathBuf,
    }

    impl JsonFileStorage {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl ScoreStorage for JsonFileStorage {
        fn load(&self) -> Result<Vec<HighScoreEntry>, StorageError> {
            match fs::read_to_string(&self.path) {
                Ok(json) => super::decode_entries(&json),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
                Err(e) => Err(e.into()),
            }
        }

        fn save(&mut self, entries: &[HighScoreEntry]) -> Result<(), StorageError> {
            let json = serde_json::to_string_pretty(entries)?;
            // Write then rename so a crash never leaves a half-written file
            let tmp = self.path.with_extension("tmp");
            fs::write(&tmp, json)?;
            fs::rename(&tmp, &self.path)?;
            Ok(())
        }
    }
}
