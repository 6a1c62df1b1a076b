//! Persistent key/value state
//!
//! A small JSON document on disk holding the values Timber needs across
//! process runs: the current log file path and the device sink snapshot.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;

/// Key for the active log file path
pub const CURRENT_LOG_FILE_KEY: &str = "timber.current-log-file";

/// Key for the device sink snapshot
pub const DEVICE_SNAPSHOT_KEY: &str = "timber.device-snapshot";

/// JSON-file backed store
///
/// Every write re-reads the file so concurrent writers in one process see
/// each other's keys. Last writer wins per key.
#[derive(Debug)]
pub struct StateStore {
    store_path: PathBuf,
    lock: Mutex<()>,
}

impl StateStore {
    /// Create a store backed by the given file
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            store_path: path,
            lock: Mutex::new(()),
        }
    }

    /// Get the path to the store file
    pub fn path(&self) -> &Path {
        &self.store_path
    }

    /// Read a value, treating missing or undecodable data as absent
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let value = self.read_map().remove(key)?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::debug!("Ignoring undecodable state for {}: {}", key, e);
                None
            }
        }
    }

    /// Store a value under `key`, replacing any previous value
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = self.read_map();
        map.insert(key.to_string(), serde_json::to_value(value)?);
        self.write_map(&map)
    }

    /// Remove a key
    pub fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = self.read_map();
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }

    /// Load the whole document; a missing or corrupt file reads as empty
    fn read_map(&self) -> Map<String, Value> {
        let content = match std::fs::read_to_string(&self.store_path) {
            Ok(content) => content,
            Err(_) => return Map::new(),
        };

        if content.trim().is_empty() {
            return Map::new();
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            _ => {
                tracing::debug!(
                    "State file {} is corrupted, starting fresh",
                    self.store_path.display()
                );
                Map::new()
            }
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.store_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.store_path, content)?;
        Ok(())
    }
}
