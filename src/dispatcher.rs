//! Message dispatch
//!
//! `Timber` owns the severity threshold and the ordered list of sinks. It is
//! normally constructed and passed around explicitly; `Timber::shared()`
//! offers a lazily created process-wide instance for hosts that want one.

use std::error::Error as StdError;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock, RwLock};

use crate::config::Config;
use crate::error::Result;
use crate::formatter::LineFormatter;
use crate::level::LogLevel;
use crate::message::{CallSite, LogMessage};
use crate::rotation::RotationManager;
use crate::sink::{ConsoleSink, DeviceSink, FileSink, HttpSink, RetentionPolicy, Sink};
use crate::store::StateStore;

static SHARED: OnceLock<Timber> = OnceLock::new();

/// Routes accepted messages to every registered sink
pub struct Timber {
    threshold: RwLock<LogLevel>,
    sinks: RwLock<Vec<Arc<dyn Sink>>>,
}

impl Timber {
    /// Create a dispatcher with no sinks and a `Verbose` threshold
    pub fn new() -> Self {
        Self {
            threshold: RwLock::new(LogLevel::Verbose),
            sinks: RwLock::new(Vec::new()),
        }
    }

    /// Process-wide dispatcher, created on first use and never reset
    pub fn shared() -> &'static Timber {
        SHARED.get_or_init(Timber::new)
    }

    /// Build a dispatcher with the sinks enabled in `config`
    ///
    /// Returns the device sink as well when one is configured so the host can
    /// forward suspend and low-memory signals to it.
    pub fn from_config(config: &Config) -> Result<(Self, Option<Arc<DeviceSink>>)> {
        let timber = Self::new();
        timber.set_threshold(config.threshold());

        let formatter = {
            let formatter = LineFormatter::new().with_millis(config.timestamp_millis);
            match &config.app_name {
                Some(name) => formatter.with_app_name(name.clone()),
                None => formatter,
            }
        };
        let store = Arc::new(StateStore::with_path(config.state_file_path()));

        if config.console {
            timber.register(ConsoleSink::with_writer(
                formatter.clone(),
                std::io::stdout(),
            ));
        }

        if config.file.enabled {
            let rotation = RotationManager::new(
                config.logs_dir(),
                formatter.app_name(),
                Arc::clone(&store),
            )
            .with_max_file_size(config.file.max_file_size);
            let retention = RetentionPolicy {
                max_age_days: config.file.max_age_days,
                max_files: config.file.max_files,
            };
            timber.register(FileSink::with_formatter(
                rotation,
                retention,
                formatter.clone(),
            ));
        }

        if let Some(http) = &config.http {
            timber.register(HttpSink::new(&http.url, &http.method)?);
        }

        let device = if config.device.enabled {
            let device = Arc::new(
                DeviceSink::with_capacity(Arc::clone(&store), config.device.capacity)
                    .with_formatter(formatter),
            );
            timber.register_arc(device.clone());
            Some(device)
        } else {
            None
        };

        Ok((timber, device))
    }

    /// Replace the threshold for subsequently dispatched messages
    pub fn set_threshold(&self, level: LogLevel) {
        *self.threshold.write().unwrap_or_else(|e| e.into_inner()) = level;
    }

    pub fn threshold(&self) -> LogLevel {
        *self.threshold.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a sink; the same sink may be registered more than once
    pub fn register(&self, sink: impl Sink + 'static) {
        self.register_arc(Arc::new(sink));
    }

    pub fn register_arc(&self, sink: Arc<dyn Sink>) {
        self.sinks
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(sink);
    }

    /// Number of registered sinks
    pub fn sink_count(&self) -> usize {
        self.sinks.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Deliver `message` to every sink if it passes the threshold
    ///
    /// Sinks run in registration order on the calling thread. A sink that
    /// errors or panics does not stop delivery to the rest.
    pub fn dispatch(&self, message: LogMessage) {
        if !self.threshold().permits(message.level()) {
            return;
        }

        // Snapshot so a sink may register another sink without deadlocking
        let sinks: Vec<Arc<dyn Sink>> = self
            .sinks
            .read()
            .map(|s| s.clone())
            .unwrap_or_else(|e| e.into_inner().clone());

        for sink in sinks {
            match panic::catch_unwind(AssertUnwindSafe(|| sink.emit(&message))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::debug!("{} sink failed: {}", sink.name(), e),
                Err(_) => tracing::debug!("{} sink panicked", sink.name()),
            }
        }
    }

    /// Build a message at `level` for `site` and dispatch it
    pub fn log_at(&self, level: LogLevel, text: impl Into<String>, site: CallSite) {
        self.dispatch(LogMessage::at(text, level, site));
    }

    pub fn error(&self, text: impl Into<String>, site: CallSite) {
        self.log_at(LogLevel::Error, text, site);
    }

    pub fn warn(&self, text: impl Into<String>, site: CallSite) {
        self.log_at(LogLevel::Warn, text, site);
    }

    pub fn info(&self, text: impl Into<String>, site: CallSite) {
        self.log_at(LogLevel::Info, text, site);
    }

    pub fn debug(&self, text: impl Into<String>, site: CallSite) {
        self.log_at(LogLevel::Debug, text, site);
    }

    pub fn verbose(&self, text: impl Into<String>, site: CallSite) {
        self.log_at(LogLevel::Verbose, text, site);
    }

    /// Mark that execution reached `site` (an empty `Info` message)
    pub fn trace(&self, site: CallSite) {
        self.log_at(LogLevel::Info, "", site);
    }

    /// Log an error value and its source chain at `Error` level
    pub fn log_failure(&self, error: &dyn StdError, site: CallSite) {
        let mut text = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            text.push_str(": ");
            text.push_str(&cause.to_string());
            source = cause.source();
        }
        self.error(text, site);
    }
}

impl Default for Timber {
    fn default() -> Self {
        Self::new()
    }
}
