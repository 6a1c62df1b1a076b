//! Log message model
//!
//! `LogMessage` is the immutable value passed to every sink. `DurableLogMessage`
//! is its serializable projection, used by the device sink snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::level::LogLevel;

/// Where a log call was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// Source path as given by `file!()`
    pub file: &'static str,
    /// Enclosing function name
    pub function: &'static str,
    /// Line number as given by `line!()`
    pub line: u32,
}

impl CallSite {
    pub const fn new(file: &'static str, function: &'static str, line: u32) -> Self {
        Self {
            file,
            function,
            line,
        }
    }
}

/// A single log event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    text: String,
    level: LogLevel,
    timestamp: DateTime<Utc>,
    source_file: String,
    function: String,
    line: u32,
}

impl LogMessage {
    /// Create a new message
    ///
    /// `file` may be a full path; only its basename without extension is kept.
    pub fn new(
        text: impl Into<String>,
        level: LogLevel,
        timestamp: DateTime<Utc>,
        file: &str,
        function: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            text: text.into(),
            level,
            timestamp,
            source_file: source_file_stem(file).to_string(),
            function: function.into(),
            line,
        }
    }

    /// Create a message stamped with the current time and the given call site
    pub fn at(text: impl Into<String>, level: LogLevel, site: CallSite) -> Self {
        Self::new(text, level, Utc::now(), site.file, site.function, site.line)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Source file basename with the extension stripped
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

/// Strip directories and the final extension from a source path
///
/// Both `/` and `\` are treated as separators. A leading dot is not an
/// extension, so `.hidden` stays `.hidden`.
pub fn source_file_stem(path: &str) -> &str {
    let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match base.rfind('.') {
        Some(pos) if pos > 0 => &base[..pos],
        _ => base,
    }
}

/// Serializable form of a `LogMessage`
///
/// Field names are the persisted schema. The timestamp is stored as RFC 3339
/// with full nanosecond precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurableLogMessage {
    pub text: String,
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    pub source_file: String,
    pub function: String,
    pub line: u32,
}

impl From<&LogMessage> for DurableLogMessage {
    fn from(message: &LogMessage) -> Self {
        Self {
            text: message.text.clone(),
            level: message.level,
            timestamp: message.timestamp,
            source_file: message.source_file.clone(),
            function: message.function.clone(),
            line: message.line,
        }
    }
}

impl From<DurableLogMessage> for LogMessage {
    // source_file is already a stem; stripping it again would eat dotted names
    fn from(durable: DurableLogMessage) -> Self {
        Self {
            text: durable.text,
            level: durable.level,
            timestamp: durable.timestamp,
            source_file: durable.source_file,
            function: durable.function,
            line: durable.line,
        }
    }
}
