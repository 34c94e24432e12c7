//! High score persistence
//!
//! A single scalar, loaded once at startup and written whenever the run's
//! score passes it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Persistence failures (high score and settings)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where the high score lives
pub trait HighScoreStore {
    fn load_high_score(&mut self) -> Result<u64, StoreError>;
    fn persist_high_score(&mut self, high_score: u64) -> Result<(), StoreError>;
}

/// In-memory store for tests and sessions without a disk
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub high_score: u64,
    /// Number of writes seen
    pub writes: usize,
}

impl HighScoreStore for MemoryStore {
    fn load_high_score(&mut self) -> Result<u64, StoreError> {
        Ok(self.high_score)
    }

    fn persist_high_score(&mut self, high_score: u64) -> Result<(), StoreError> {
        self.high_score = high_score;
        self.writes += 1;
        Ok(())
    }
}

/// On-disk record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct HighScoreRecord {
    high_score: u64,
}

/// JSON file store
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
    /// A missing file reads as 0
    fn load_high_score(&mut self) -> Result<u64, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("No high score at {}, starting fresh", self.path.display());
                return Ok(0);
            }
            Err(err) => return Err(err.into()),
        };
        let record: HighScoreRecord = serde_json::from_str(&json)?;
        log::info!("Loaded high score {}", record.high_score);
        Ok(record.high_score)
    }

    fn persist_high_score(&mut self, high_score: u64) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string(&HighScoreRecord { high_score })?;
        fs::write(&self.path, json)?;
        log::debug!("High score {} saved", high_score);
        Ok(())
    }
}
