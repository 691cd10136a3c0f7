//! Best score persistence
//!
//! The simulation only ever sees a plain `u32`: it is read once when a
//! session is created and handed back whenever it changes. Stores never lower
//! a value they already hold, so a stale or racing writer cannot make the best
//! score go backwards.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk envelope: `{"best": 42}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestScore {
    pub best: u32,
}

impl BestScore {
    pub fn new(best: u32) -> Self {
        Self { best }
    }

    /// Parse a stored envelope. Anything unreadable counts as no record.
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str::<BestScore>(json) {
            Ok(score) => Some(score),
            Err(err) => {
                log::warn!("ignoring unreadable best score: {}", err);
                None
            }
        }
    }

    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }

    /// Raise the record to `score` if it beats it. Returns true if raised.
    pub fn record(&mut self, score: u32) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }
}

/// Where a session's best score comes from and goes to
pub trait BestScoreStore {
    /// Stored best, or 0 if there is none
    fn load(&self) -> u32;

    /// Store `score` unless the stored value is already at least as high
    fn save(&mut self, score: u32) -> io::Result<()>;
}

/// Keeps the best score for the lifetime of the process only
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: BestScore,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BestScoreStore for MemoryStore {
    fn load(&self) -> u32 {
        self.record.best
    }

    fn save(&mut self, score: u32) -> io::Result<()> {
        self.record.record(score);
        Ok(())
    }
}

/// Best score stored as a small JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Option<BestScore> {
        let json = fs::read_to_string(&self.path).ok()?;
        BestScore::from_json(&json)
    }
}

impl BestScoreStore for JsonFileStore {
    fn load(&self) -> u32 {
        match self.read() {
            Some(record) => {
                log::info!("loaded best score {} from {}", record.best, self.path.display());
                record.best
            }
            None => {
                log::info!("no best score at {}, starting fresh", self.path.display());
                0
            }
        }
    }

    fn save(&mut self, score: u32) -> io::Result<()> {
        let mut record = self.read().unwrap_or_default();
        if !record.record(score) {
            log::debug!("best score {} not above stored {}", score, record.best);
            return Ok(());
        }
        let json = serde_json::to_string(&record).map_err(io::Error::other)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, json)?;
        log::info!("best score {} saved to {}", record.best, self.path.display());
        Ok(())
    }
}
