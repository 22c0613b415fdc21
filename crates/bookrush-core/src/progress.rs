//! Persisted progress: a single integer, the highest day reached.
//!
//! Read once at startup and written when a day at (or above) the current
//! high-water mark is completed. Failures on either path degrade gracefully:
//! a missing or corrupt file means day 1, and a failed write is logged by the
//! engine and retried on the next completion.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("corrupt progress data: {0:?}")]
    Corrupt(String),
}

/// Storage for the highest day reached.
pub trait ProgressStore: std::fmt::Debug {
    fn load(&mut self) -> Result<u32, ProgressError>;
    fn save(&mut self, highest_day: u32) -> Result<(), ProgressError>;
}

/// File-backed store: the day number as ASCII in a small file.
#[derive(Debug, Clone)]
pub struct FileProgressStore {
    path: PathBuf,
}

impl FileProgressStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for FileProgressStore {
    fn load(&mut self) -> Result<u32, ProgressError> {
        let content = std::fs::read_to_string(&self.path)?;
        let trimmed = content.trim();
        trimmed
            .parse::<u32>()
            .map_err(|_| ProgressError::Corrupt(trimmed.to_string()))
    }

    fn save(&mut self, highest_day: u32) -> Result<(), ProgressError> {
        std::fs::write(&self.path, format!("{highest_day}\n"))?;
        Ok(())
    }
}

/// In-memory store for tests and sandboxes.
#[derive(Debug, Clone, Default)]
pub struct MemoryProgressStore {
    highest_day: u32,
}

impl MemoryProgressStore {
    pub fn new(highest_day: u32) -> Self {
        Self { highest_day }
    }

    pub fn highest_day(&self) -> u32 {
        self.highest_day
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&mut self) -> Result<u32, ProgressError> {
        Ok(self.highest_day.max(1))
    }

    fn save(&mut self, highest_day: u32) -> Result<(), ProgressError> {
        self.highest_day = highest_day;
        Ok(())
    }
}
