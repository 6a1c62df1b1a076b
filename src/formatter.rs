//! Message formatting
//!
//! Renders a `LogMessage` as a single line:
//! `<LEVEL> <yyyy-MM-dd HH:mm:ss[.mmm]> <appName> [<sourceFile> '<function>'] <text>`

use chrono::{FixedOffset, Local};

use crate::message::LogMessage;

/// Placeholder used when the process name cannot be determined
pub const UNNAMED_APP: &str = "<UnnamedApp>";

/// Turns a message into one human-readable line
pub trait MessageFormatter: Send + Sync {
    /// Format a message, without a trailing newline
    fn format(&self, message: &LogMessage) -> String;
}

/// Get the name of the running application
///
/// Uses the executable's file stem, then `argv[0]`, then `UNNAMED_APP`.
pub fn application_name() -> String {
    let from_exe = std::env::current_exe()
        .ok()
        .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()));

    let from_args = || {
        std::env::args().next().and_then(|arg0| {
            std::path::Path::new(&arg0)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
    };

    from_exe
        .or_else(from_args)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNNAMED_APP.to_string())
}

/// Default line formatter
#[derive(Debug, Clone)]
pub struct LineFormatter {
    app_name: String,
    millis: bool,
    /// Fixed offset for timestamps; `None` renders in the local time zone
    offset: Option<FixedOffset>,
}

impl LineFormatter {
    /// Create a formatter with millisecond timestamps in local time
    pub fn new() -> Self {
        Self {
            app_name: application_name(),
            millis: true,
            offset: None,
        }
    }

    /// Override the application name
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        let app_name = app_name.into();
        self.app_name = if app_name.is_empty() {
            UNNAMED_APP.to_string()
        } else {
            app_name
        };
        self
    }

    /// Enable or disable the `.mmm` suffix
    pub fn with_millis(mut self, millis: bool) -> Self {
        self.millis = millis;
        self
    }

    /// Render timestamps at a fixed UTC offset instead of local time
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    fn timestamp(&self, message: &LogMessage) -> String {
        let pattern = if self.millis {
            "%Y-%m-%d %H:%M:%S%.3f"
        } else {
            "%Y-%m-%d %H:%M:%S"
        };
        let ts = message.timestamp();
        match self.offset {
            Some(offset) => ts.with_timezone(&offset).format(pattern).to_string(),
            None => ts.with_timezone(&Local).format(pattern).to_string(),
        }
    }
}

impl Default for LineFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageFormatter for LineFormatter {
    fn format(&self, message: &LogMessage) -> String {
        format!(
            "{} {} {} [{} '{}'] {}",
            message.level(),
            self.timestamp(message),
            self.app_name,
            message.source_file(),
            message.function(),
            message.text()
        )
    }
}
