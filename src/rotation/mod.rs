//! Log file rotation
//!
//! Chooses the active log file, rotates it by size and prunes old files by
//! age and count.

mod file_writer;
mod retention;

pub use file_writer::{log_file_name, RotationManager, DEFAULT_MAX_FILE_SIZE, LOG_FILE_EXTENSION};
pub use retention::{
    purge_excess, purge_excess_by, purge_expired, DEFAULT_MAX_FILES, DEFAULT_RETENTION_DAYS,
};
