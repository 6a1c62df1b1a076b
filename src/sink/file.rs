//! Rotating file sink

use crate::error::Result;
use crate::formatter::{LineFormatter, MessageFormatter};
use crate::message::LogMessage;
use crate::rotation::{
    self, RotationManager, DEFAULT_MAX_FILES, DEFAULT_RETENTION_DAYS, LOG_FILE_EXTENSION,
};

use super::Sink;

/// How many log files to keep, and for how long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Files not modified within this many days are deleted
    pub max_age_days: u64,
    /// Only this many newest files survive the count purge
    pub max_files: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_age_days: DEFAULT_RETENTION_DAYS,
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

/// Appends formatted lines to the current rotating log file
pub struct FileSink {
    formatter: Box<dyn MessageFormatter>,
    rotation: RotationManager,
}

impl FileSink {
    /// Create a file sink and run retention once over its logs directory
    pub fn new(rotation: RotationManager, retention: RetentionPolicy) -> Self {
        Self::with_formatter(rotation, retention, LineFormatter::new())
    }

    pub fn with_formatter(
        rotation: RotationManager,
        retention: RetentionPolicy,
        formatter: impl MessageFormatter + 'static,
    ) -> Self {
        let sink = Self {
            formatter: Box::new(formatter),
            rotation,
        };
        sink.apply_retention(retention);
        sink
    }

    pub fn rotation(&self) -> &RotationManager {
        &self.rotation
    }

    fn apply_retention(&self, retention: RetentionPolicy) {
        let logs_dir = self.rotation.logs_dir();

        match rotation::purge_expired(logs_dir, LOG_FILE_EXTENSION, retention.max_age_days) {
            Ok(count) if count > 0 => tracing::info!("Cleaned up {} expired log files", count),
            Ok(_) => {}
            Err(e) => tracing::debug!("Failed to purge expired log files: {}", e),
        }

        match rotation::purge_excess(logs_dir, retention.max_files) {
            Ok(count) if count > 0 => tracing::info!("Cleaned up {} excess log files", count),
            Ok(_) => {}
            Err(e) => tracing::debug!("Failed to purge excess log files: {}", e),
        }
    }
}

impl Sink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    fn formatter(&self) -> &dyn MessageFormatter {
        self.formatter.as_ref()
    }

    fn emit(&self, message: &LogMessage) -> Result<()> {
        let mut line = self.formatter.format(message);
        line.push('\n');
        self.rotation.append(&line)?;
        Ok(())
    }
}
