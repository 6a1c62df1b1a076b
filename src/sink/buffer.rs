//! In-memory log buffer
//!
//! Provides a thread-safe ring buffer that stores the most recent messages.

use std::collections::VecDeque;
use std::sync::RwLock;

use crate::message::LogMessage;

/// Default capacity of the device buffer
pub const DEFAULT_DEVICE_CAPACITY: usize = 200;

/// Thread-safe ring buffer for storing log messages
#[derive(Debug)]
pub struct RingBuffer {
    /// Messages in insertion order (capped at capacity)
    entries: RwLock<VecDeque<LogMessage>>,
    /// Maximum messages to keep
    capacity: usize,
}

impl RingBuffer {
    /// Create a new buffer with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Push a message, evicting the oldest when full
    pub fn push(&self, message: LogMessage) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(message);
    }

    /// Replace the contents, keeping only the newest `capacity` messages
    pub fn replace(&self, messages: Vec<LogMessage>) {
        let skip = messages.len().saturating_sub(self.capacity);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
        entries.extend(messages.into_iter().skip(skip));
    }

    /// Get all messages, oldest first
    pub fn all_entries(&self) -> Vec<LogMessage> {
        self.entries
            .read()
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Get all messages, newest first
    pub fn newest_first(&self) -> Vec<LogMessage> {
        self.entries
            .read()
            .map(|e| e.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    /// Get the number of messages in the buffer
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every message
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }
}
