//! Log file retention management
//!
//! Handles cleanup of old log files based on age and on file count.

use std::cmp::Ordering;
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::Result;

/// Default retention period in days
pub const DEFAULT_RETENTION_DAYS: u64 = 180;

/// Default number of files kept in the logs directory
pub const DEFAULT_MAX_FILES: usize = 5;

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |n| n.starts_with('.'))
}

/// Delete files with `extension` not modified within `retention_days`
///
/// Files whose modification time cannot be read are left alone.
/// Returns the number of files deleted.
pub fn purge_expired(logs_dir: &Path, extension: &str, retention_days: u64) -> Result<usize> {
    if !logs_dir.exists() {
        return Ok(0);
    }

    let retention_duration = Duration::from_secs(retention_days.saturating_mul(24 * 60 * 60));
    let cutoff = SystemTime::now()
        .checked_sub(retention_duration)
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let mut deleted_count = 0;

    for entry in fs::read_dir(logs_dir)? {
        let Ok(entry) = entry else {
            continue;
        };
        let path = entry.path();

        if is_hidden(&path) || path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }

        // Check file modification time
        if let Ok(metadata) = entry.metadata() {
            if let Ok(modified) = metadata.modified() {
                if modified < cutoff && fs::remove_file(&path).is_ok() {
                    deleted_count += 1;
                }
            }
        }
    }

    Ok(deleted_count)
}

/// Keep only the `max_files` newest files by creation time
///
/// Returns the number of files deleted.
pub fn purge_excess(logs_dir: &Path, max_files: usize) -> Result<usize> {
    purge_excess_by(logs_dir, max_files, |m| m.created().ok())
}

/// Keep only the `max_files` newest files, dated by `file_date`
///
/// Files for which `file_date` returns `None` sort as newest, so they are the
/// last to be deleted.
pub fn purge_excess_by<F>(logs_dir: &Path, max_files: usize, file_date: F) -> Result<usize>
where
    F: Fn(&Metadata) -> Option<SystemTime>,
{
    if !logs_dir.exists() {
        return Ok(0);
    }

    let mut files: Vec<(PathBuf, Option<SystemTime>)> = Vec::new();
    for entry in fs::read_dir(logs_dir)? {
        let Ok(entry) = entry else {
            continue;
        };
        let path = entry.path();
        if is_hidden(&path) {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        files.push((path, file_date(&metadata)));
    }

    if files.len() <= max_files {
        return Ok(0);
    }

    // Newest first, undated files ahead of everything
    files.sort_by(|(_, a), (_, b)| match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => b.cmp(a),
    });

    let mut deleted_count = 0;
    for (path, _) in files.iter().skip(max_files) {
        if fs::remove_file(path).is_ok() {
            deleted_count += 1;
        }
    }

    Ok(deleted_count)
}
