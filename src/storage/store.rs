use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::slot::StorageSlot;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("state file {0} is not a JSON object")]
    NotAnObject(PathBuf),
}

/// File-backed state document shared by every component of a host.
///
/// Each component owns one top-level section keyed by its [`StorageSlot`].
/// Writes replace a single section and leave every other section untouched.
pub struct StateStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl StateStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_section<T: DeserializeOwned>(&self, slot: &StorageSlot) -> StoreResult<Option<T>> {
        let mut document = self.read_document()?;
        match document.remove(slot.key()) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub fn save_section<T: Serialize>(&self, slot: &StorageSlot, value: &T) -> StoreResult<()> {
        let _lock = self.write_lock.lock();

        let mut document = self.read_document()?;
        document.insert(slot.key().to_string(), serde_json::to_value(value)?);

        self.atomic_write(&document)?;
        tracing::debug!(slot = %slot, path = %self.path.display(), "Saved state section");
        Ok(())
    }

    fn read_document(&self) -> StoreResult<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(StoreError::NotAnObject(self.path.clone())),
        }
    }

    fn atomic_write(&self, document: &Map<String, Value>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(document)?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, content)?;

        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}
