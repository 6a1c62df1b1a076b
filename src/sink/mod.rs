//! Log sinks
//!
//! A sink is a delivery target for messages that passed the dispatcher's
//! threshold. Sinks do no filtering of their own.

mod buffer;
mod console;
mod device;
mod file;
mod http;

pub use buffer::{RingBuffer, DEFAULT_DEVICE_CAPACITY};
pub use console::ConsoleSink;
pub use device::{DeviceSink, DeviceSnapshot, SNAPSHOT_VERSION};
pub use file::{FileSink, RetentionPolicy};
pub use http::{HttpPayload, HttpSink};

use crate::error::Result;
use crate::formatter::MessageFormatter;
use crate::message::LogMessage;

/// A delivery target for log messages
pub trait Sink: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// Formatter used to render messages for this sink
    fn formatter(&self) -> &dyn MessageFormatter;

    /// Deliver one message
    ///
    /// Errors are reported to the dispatcher, which absorbs them.
    fn emit(&self, message: &LogMessage) -> Result<()>;
}
