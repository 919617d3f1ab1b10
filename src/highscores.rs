//! High score leaderboard
//!
//! Keeps the top 5 finished rounds, persisted through a [`ScoreStorage`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::consts::MAX_HIGH_SCORES;
use crate::persistence::ScoreStorage;

/// A single finished round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Final score
    pub score: u64,
    /// Unix timestamp (ms) when the round ended, 0 if unknown
    #[serde(alias = "date", default, deserialize_with = "timestamp_or_date")]
    pub timestamp: f64,
    /// Highest combo reached during the round
    #[serde(alias = "combo", default)]
    pub max_combo: u32,
}

/// Accept a millisecond number or the older free-form date string
///
/// Strings that are not a number (e.g. a locale date) become 0, "unknown".
fn timestamp_or_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Millis(f64),
        Text(String),
    }

    Ok(match Stored::deserialize(deserializer)? {
        Stored::Millis(ms) => ms,
        Stored::Text(text) => text.trim().parse::<f64>().unwrap_or(0.0),
    })
}

/// Result of recording a finished round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOutcome {
    /// Rank achieved (1-indexed) if the entry survived truncation
    pub rank: Option<usize>,
}

impl RecordOutcome {
    /// True if the entry made it into the top N
    pub fn is_new_high_score(&self) -> bool {
        self.rank.is_some()
    }
}

/// Top-N leaderboard, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<HighScoreEntry>,
}

impl Leaderboard {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from arbitrary stored entries (re-sorted and truncated)
    pub fn from_entries(mut entries: Vec<HighScoreEntry>) -> Self {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HIGH_SCORES);
        Self { entries }
    }

    /// Load from storage; any failure yields an empty leaderboard
    pub fn load_from(storage: &dyn ScoreStorage) -> Self {
        match storage.load() {
            Ok(entries) => {
                log::info!("Loaded {} high scores", entries.len());
                Self::from_entries(entries)
            }
            Err(e) => {
                log::warn!("Could not load high scores, starting fresh: {e}");
                Self::new()
            }
        }
    }

    /// Write to storage; failures are logged, memory stays authoritative
    pub fn save_to(&self, storage: &mut dyn ScoreStorage) {
        match storage.save(&self.entries) {
            Ok(()) => log::info!("High scores saved ({} entries)", self.entries.len()),
            Err(e) => log::warn!("Could not save high scores: {e}"),
        }
    }

    /// Check if a score would survive insertion right now
    ///
    /// Ties lose to entries already on the board.
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Insert a finished round, re-sort, keep the top N
    ///
    /// The sort is stable with the new entry appended last, so an equal score
    /// already on the board stays ahead of it.
    pub fn record(&mut self, entry: HighScoreEntry) -> RecordOutcome {
        self.entries.push(entry);
        let inserted = self.entries.len() - 1;

        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| self.entries[b].score.cmp(&self.entries[a].score));
        let rank = order
            .iter()
            .position(|&i| i == inserted)
            .filter(|&pos| pos < MAX_HIGH_SCORES)
            .map(|pos| pos + 1);

        let mut sorted: Vec<HighScoreEntry> = Vec::with_capacity(order.len());
        for i in order {
            sorted.push(self.entries[i].clone());
        }
        sorted.truncate(MAX_HIGH_SCORES);
        self.entries = sorted;

        RecordOutcome { rank }
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn scores(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.score).collect()
    }
}

/// Format a timestamp relative to `now` (both unix ms)
pub fn format_date(timestamp: f64, now: f64) -> String {
    if !(timestamp > 0.0) {
        return "Unknown".to_string();
    }
    let diff_secs = (now - timestamp).max(0.0) / 1000.0;
    let diff_mins = diff_secs / 60.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as i64;
        if days == 1 {
            "Yesterday".to_string()
        } else {
            format!("{} days ago", days)
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as i64;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as i64;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}
