//! Timber - client-side logging with pluggable sinks
//!
//! A `Timber` dispatcher filters messages against one central threshold and
//! fans them out to console, rotating file, HTTP and in-memory device sinks.

#[macro_use]
mod macros;

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod formatter;
pub mod level;
pub mod message;
pub mod rotation;
pub mod sink;
pub mod store;

pub use dispatcher::Timber;
pub use error::{Error, Result};
pub use formatter::{LineFormatter, MessageFormatter};
pub use level::LogLevel;
pub use message::{CallSite, DurableLogMessage, LogMessage};
pub use sink::Sink;
