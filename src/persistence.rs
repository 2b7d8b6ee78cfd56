//! Durable key-value storage for the best score and the chosen difficulty.
//!
//! The engine only sees the [`ScoreStore`] trait. Two implementations ship
//! with the crate: an in-memory store for tests and embedding, and a small
//! JSON file used by the terminal front end.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::game::Difficulty;

pub trait ScoreStore {
    fn high_score(&self) -> u32;
    fn set_high_score(&mut self, score: u32) -> Result<()>;
    fn difficulty(&self) -> Difficulty;
    fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<()>;
}

/// Values persisted between sessions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub high_score: u32,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: StoredRecord,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_high_score(high_score: u32) -> Self {
        Self {
            record: StoredRecord {
                high_score,
                ..Default::default()
            },
        }
    }
}

impl ScoreStore for MemoryStore {
    fn high_score(&self) -> u32 {
        self.record.high_score
    }

    fn set_high_score(&mut self, score: u32) -> Result<()> {
        self.record.high_score = score;
        Ok(())
    }

    fn difficulty(&self) -> Difficulty {
        self.record.difficulty
    }

    fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<()> {
        self.record.difficulty = difficulty;
        Ok(())
    }
}

/// JSON file holding a [`StoredRecord`]; every write rewrites the file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    record: StoredRecord,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file starts from defaults and is
    /// created on the first write.
    pub fn open(path: &Path) -> Result<Self> {
        let record = if path.exists() {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read store from {:?}", path))?;
            serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse store at {:?}", path))?
        } else {
            StoredRecord::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            record,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }
        let json =
            serde_json::to_string_pretty(&self.record).context("Failed to serialize store")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write store to {:?}", self.path))
    }
}

impl ScoreStore for JsonFileStore {
    fn high_score(&self) -> u32 {
        self.record.high_score
    }

    fn set_high_score(&mut self, score: u32) -> Result<()> {
        self.record.high_score = score;
        self.save()
    }

    fn difficulty(&self) -> Difficulty {
        self.record.difficulty
    }

    fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<()> {
        self.record.difficulty = difficulty;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::with_high_score(40);
        assert_eq!(store.high_score(), 40);
        assert_eq!(store.difficulty(), Difficulty::Normal);

        store.set_high_score(55).unwrap();
        store.set_difficulty(Difficulty::Hard).unwrap();
        assert_eq!(store.high_score(), 55);
        assert_eq!(store.difficulty(), Difficulty::Hard);
    }

    #[test]
    fn test_file_store_defaults_when_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(&temp_dir.path().join("scores.json")).unwrap();

        assert_eq!(store.high_score(), 0);
        assert_eq!(store.difficulty(), Difficulty::Normal);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("scores.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set_high_score(120).unwrap();
        store.set_difficulty(Difficulty::Easy).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.high_score(), 120);
        assert_eq!(reopened.difficulty(), Difficulty::Easy);
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scores.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(JsonFileStore::open(&path).is_err());
    }
}
