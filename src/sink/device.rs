//! In-memory device sink
//!
//! Keeps the most recent messages for an on-device viewer. The buffer is
//! snapshotted to the state store when the host suspends and restored when
//! the sink is created.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::formatter::{LineFormatter, MessageFormatter};
use crate::message::{DurableLogMessage, LogMessage};
use crate::store::{StateStore, DEVICE_SNAPSHOT_KEY};

use super::buffer::{RingBuffer, DEFAULT_DEVICE_CAPACITY};
use super::Sink;

/// Current snapshot schema version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persisted form of the device buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub version: u32,
    /// Oldest first
    pub messages: Vec<DurableLogMessage>,
}

impl DeviceSnapshot {
    pub fn from_messages(messages: &[LogMessage]) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            messages: messages.iter().map(DurableLogMessage::from).collect(),
        }
    }
}

/// Bounded in-memory sink with snapshot persistence
pub struct DeviceSink {
    buffer: RingBuffer,
    store: Arc<StateStore>,
    formatter: Box<dyn MessageFormatter>,
}

impl DeviceSink {
    /// Create a sink holding up to 200 messages, restored from `store`
    pub fn new(store: Arc<StateStore>) -> Self {
        Self::with_capacity(store, DEFAULT_DEVICE_CAPACITY)
    }

    pub fn with_capacity(store: Arc<StateStore>, capacity: usize) -> Self {
        let sink = Self {
            buffer: RingBuffer::new(capacity),
            store,
            formatter: Box::new(LineFormatter::new()),
        };
        sink.restore();
        sink
    }

    /// Replace the formatter used by `export_text`
    pub fn with_formatter(mut self, formatter: impl MessageFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Messages newest first, for presentation
    pub fn messages_newest_first(&self) -> Vec<LogMessage> {
        self.buffer.newest_first()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Render the history newest first, one formatted line per message
    pub fn export_text(&self) -> String {
        self.buffer
            .newest_first()
            .iter()
            .map(|m| self.formatter.format(m))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The host is low on memory: drop everything held
    pub fn on_low_memory(&self) {
        self.buffer.clear();
    }

    /// The host is being suspended: persist the buffer on a background thread
    ///
    /// Returns the worker handle, or `None` if no thread could be started, in
    /// which case the snapshot was written synchronously.
    pub fn on_suspend(&self) -> Option<JoinHandle<()>> {
        let snapshot = DeviceSnapshot::from_messages(&self.buffer.all_entries());
        let store = Arc::clone(&self.store);

        let worker = thread::Builder::new()
            .name("timber-device-persist".to_string())
            .spawn({
                let snapshot = snapshot.clone();
                let store = Arc::clone(&store);
                move || write_snapshot(&store, &snapshot)
            });

        match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::debug!("Could not start persist thread, writing inline: {}", e);
                write_snapshot(&store, &snapshot);
                None
            }
        }
    }

    /// Persist the buffer on the calling thread, overwriting any prior snapshot
    pub fn persist(&self) -> Result<()> {
        let snapshot = DeviceSnapshot::from_messages(&self.buffer.all_entries());
        self.store.set(DEVICE_SNAPSHOT_KEY, &snapshot)
    }

    /// Load the last snapshot; missing, corrupt or foreign snapshots leave it empty
    fn restore(&self) {
        match self.store.get::<DeviceSnapshot>(DEVICE_SNAPSHOT_KEY) {
            Some(snapshot) if snapshot.version == SNAPSHOT_VERSION => {
                self.buffer
                    .replace(snapshot.messages.into_iter().map(LogMessage::from).collect());
            }
            Some(snapshot) => {
                tracing::debug!(
                    "Ignoring device snapshot with unknown version {}",
                    snapshot.version
                );
            }
            None => {}
        }
    }
}

fn write_snapshot(store: &StateStore, snapshot: &DeviceSnapshot) {
    if let Err(e) = store.set(DEVICE_SNAPSHOT_KEY, snapshot) {
        tracing::debug!("Failed to persist device log snapshot: {}", e);
    }
}

impl Sink for DeviceSink {
    fn name(&self) -> &'static str {
        "device"
    }

    fn formatter(&self) -> &dyn MessageFormatter {
        self.formatter.as_ref()
    }

    fn emit(&self, message: &LogMessage) -> Result<()> {
        self.buffer.push(message.clone());
        Ok(())
    }
}
