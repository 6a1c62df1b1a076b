//! Console sink

use std::io::Write;
use std::sync::Mutex;

use crate::error::Result;
use crate::formatter::{LineFormatter, MessageFormatter};
use crate::message::LogMessage;

use super::Sink;

/// Writes one formatted line per message to stdout
pub struct ConsoleSink {
    formatter: Box<dyn MessageFormatter>,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    /// Console sink writing to stdout with the default formatter
    pub fn new() -> Self {
        Self::with_writer(LineFormatter::new(), std::io::stdout())
    }

    /// Console sink with a custom formatter and output
    pub fn with_writer(
        formatter: impl MessageFormatter + 'static,
        out: impl Write + Send + 'static,
    ) -> Self {
        Self {
            formatter: Box::new(formatter),
            out: Mutex::new(Box::new(out)),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    fn formatter(&self) -> &dyn MessageFormatter {
        self.formatter.as_ref()
    }

    fn emit(&self, message: &LogMessage) -> Result<()> {
        let line = self.formatter.format(message);
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(out, "{}", line)?;
        out.flush()?;
        Ok(())
    }
}
