//! Active log file selection and size-based rotation
//!
//! The current file path is cached in memory and mirrored to the state store
//! so a restarted process keeps appending to the same file until it outgrows
//! the size limit.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::store::{StateStore, CURRENT_LOG_FILE_KEY};

/// Default size limit before a new file is started (1 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Extension used for log files
pub const LOG_FILE_EXTENSION: &str = "log";

/// Build a log file name: `<app>_<yyyy-MM-dd_HH-mm>.log`
///
/// A non-zero `suffix` is appended before the extension to disambiguate
/// files allocated within the same minute.
pub fn log_file_name(app_name: &str, at: DateTime<Utc>, suffix: usize) -> String {
    let app = app_name.replace(['/', '\\'], "_");
    let timestamp = at.format("%Y-%m-%d_%H-%M");
    if suffix == 0 {
        format!("{}_{}.{}", app, timestamp, LOG_FILE_EXTENSION)
    } else {
        format!("{}_{}_{}.{}", app, timestamp, suffix, LOG_FILE_EXTENSION)
    }
}

/// Owns the "current log file" and appends lines to it
#[derive(Debug)]
pub struct RotationManager {
    logs_dir: PathBuf,
    app_name: String,
    store: Arc<StateStore>,
    max_file_size: u64,
    /// Current file, loaded from the store on first use. Held across the
    /// read-size / maybe-rotate / append sequence.
    current: Mutex<Option<PathBuf>>,
}

impl RotationManager {
    pub fn new(logs_dir: PathBuf, app_name: impl Into<String>, store: Arc<StateStore>) -> Self {
        Self {
            logs_dir,
            app_name: app_name.into(),
            store,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            current: Mutex::new(None),
        }
    }

    /// Override the rotation size limit
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Get the current log file path, allocating one if none is known yet
    pub fn current_path(&self) -> Result<PathBuf> {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        self.current_locked(&mut current)
    }

    /// Start a new log file and make it current
    pub fn rotate(&self) -> Result<PathBuf> {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        let previous = current
            .clone()
            .or_else(|| self.store.get::<PathBuf>(CURRENT_LOG_FILE_KEY));
        let path = self.allocate(previous.as_deref())?;
        *current = Some(path.clone());
        Ok(path)
    }

    /// Append a line to the current file, rotating first if it is over the limit
    ///
    /// The limit is checked against the bytes already on disk, so the line that
    /// triggers a rotation lands in the fresh file and a single large line can
    /// still push a file past the limit. Returns the path written to.
    pub fn append(&self, line: &str) -> Result<PathBuf> {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());

        let mut path = self.current_locked(&mut current)?;
        let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        if size > self.max_file_size {
            tracing::debug!(
                "Log file {} reached {} bytes, rotating",
                path.display(),
                size
            );
            path = self.allocate(Some(&path))?;
            *current = Some(path.clone());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(line.as_bytes())?;

        Ok(path)
    }

    fn current_locked(&self, current: &mut Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = current.as_ref() {
            return Ok(path.clone());
        }

        let path = match self.store.get::<PathBuf>(CURRENT_LOG_FILE_KEY) {
            Some(path) if path.starts_with(&self.logs_dir) => path,
            Some(path) => {
                tracing::debug!(
                    "Stored log file {} is outside {}, starting a new one",
                    path.display(),
                    self.logs_dir.display()
                );
                self.allocate(Some(&path))?
            }
            None => self.allocate(None)?,
        };
        *current = Some(path.clone());
        Ok(path)
    }

    /// Pick a fresh file name and persist it
    ///
    /// Persisting is best-effort: a store that cannot be written only costs
    /// continuity across restarts.
    fn allocate(&self, previous: Option<&Path>) -> Result<PathBuf> {
        fs::create_dir_all(&self.logs_dir)?;

        let now = Utc::now();
        let mut suffix = 0;
        let path = loop {
            let candidate = self
                .logs_dir
                .join(log_file_name(&self.app_name, now, suffix));
            if previous != Some(candidate.as_path()) && !candidate.exists() {
                break candidate;
            }
            suffix += 1;
        };

        if let Err(e) = self.store.set(CURRENT_LOG_FILE_KEY, &path) {
            tracing::debug!("Failed to persist current log file: {}", e);
        }
        tracing::debug!("New log file: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn manager(temp_dir: &TempDir) -> RotationManager {
        let store = Arc::new(StateStore::with_path(temp_dir.path().join("state.json")));
        RotationManager::new(temp_dir.path().join("logs"), "Shop", store)
    }

    #[test]
    fn test_log_file_name() {
        let at = Utc.with_ymd_and_hms(2026, 1, 21, 14, 30, 45).single().unwrap();
        assert_eq!(log_file_name("Shop", at, 0), "Shop_2026-01-21_14-30.log");
        assert_eq!(log_file_name("Shop", at, 2), "Shop_2026-01-21_14-30_2.log");
        assert_eq!(log_file_name("a/b", at, 0), "a_b_2026-01-21_14-30.log");
    }

    #[test]
    fn test_current_path_is_allocated_and_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);

        let path = manager.current_path().unwrap();
        assert!(path.starts_with(temp_dir.path().join("logs")));
        assert!(path.to_string_lossy().ends_with(".log"));
        assert!(manager.logs_dir().is_dir());

        // Stable across calls and across instances sharing the store
        assert_eq!(manager.current_path().unwrap(), path);
        let reopened = self::manager(&temp_dir);
        assert_eq!(reopened.current_path().unwrap(), path);
    }

    #[test]
    fn test_append_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);

        let path = manager.append("first\n").unwrap();
        manager.append("second\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_rotation_after_exceeding_limit() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);

        let big = "x".repeat(DEFAULT_MAX_FILE_SIZE as usize);
        let first = manager.append(&big).unwrap();
        // Exactly at the limit: not over it yet
        assert_eq!(manager.append("\n").unwrap(), first);

        // Now over 1 MiB on disk, so this append goes to a fresh file
        let second = manager.append("after rotation\n").unwrap();
        assert_ne!(first, second);
        assert_eq!(fs::read_to_string(&second).unwrap(), "after rotation\n");
        assert_eq!(manager.current_path().unwrap(), second);
        assert!(first.exists());
    }

    #[test]
    fn test_oversized_line_lands_in_current_file() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir).with_max_file_size(10);

        let first = manager.append("this line is longer than ten bytes\n").unwrap();
        let len = fs::metadata(&first).unwrap().len();
        assert!(len > 10);

        let second = manager.append("next\n").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_rotate_yields_distinct_paths() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);

        let a = manager.append("a\n").unwrap();
        let b = manager.rotate().unwrap();
        manager.append("b\n").unwrap();
        let c = manager.rotate().unwrap();

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_recreates_deleted_logs_dir() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);

        let path = manager.append("a\n").unwrap();
        fs::remove_dir_all(manager.logs_dir()).unwrap();

        assert_eq!(manager.append("b\n").unwrap(), path);
        assert_eq!(fs::read_to_string(&path).unwrap(), "b\n");
    }

    #[test]
    fn test_unwritable_state_still_writes_lines() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the state directory should be
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let store = Arc::new(StateStore::with_path(blocker.join("state.json")));
        let manager = RotationManager::new(temp_dir.path().join("logs"), "Shop", store);

        let first = manager.append("one\n").unwrap();
        let second = manager.append("two\n").unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&first).unwrap(), "one\ntwo\n");
        assert_eq!(fs::read_dir(manager.logs_dir()).unwrap().count(), 1);
    }

    #[test]
    fn test_current_path_is_cached_after_first_use() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(StateStore::with_path(temp_dir.path().join("state.json")));
        let manager = RotationManager::new(temp_dir.path().join("logs"), "Shop", store.clone());

        let first = manager.append("a\n").unwrap();
        store
            .set(CURRENT_LOG_FILE_KEY, &manager.logs_dir().join("other.log"))
            .unwrap();

        assert_eq!(manager.append("b\n").unwrap(), first);
        assert_eq!(fs::read_to_string(&first).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_stored_path_outside_logs_dir_is_replaced() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(StateStore::with_path(temp_dir.path().join("state.json")));
        let stale = temp_dir.path().join("old-logs/Shop_2025-01-01_00-00.log");
        store.set(CURRENT_LOG_FILE_KEY, &stale).unwrap();

        let manager = RotationManager::new(temp_dir.path().join("logs"), "Shop", store.clone());
        let path = manager.append("a\n").unwrap();

        assert!(path.starts_with(manager.logs_dir()));
        assert!(!stale.exists());
        assert_eq!(store.get::<PathBuf>(CURRENT_LOG_FILE_KEY), Some(path));
    }

    #[test]
    fn test_concurrent_appends_rotate_once() {
        let temp_dir = TempDir::new().unwrap();
        let manager = Arc::new(manager(&temp_dir).with_max_file_size(100));

        let first = manager.append(&format!("{}\n", "x".repeat(100))).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let manager = Arc::clone(&manager);
                std::thread::spawn(move || manager.append(&format!("line {}\n", i)).unwrap())
            })
            .collect();
        let paths: Vec<PathBuf> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let second = &paths[0];
        assert_ne!(second, &first);
        assert!(paths.iter().all(|p| p == second));
        assert_eq!(fs::read_dir(manager.logs_dir()).unwrap().count(), 2);
        assert_eq!(fs::read_to_string(second).unwrap().lines().count(), 8);
    }
}
