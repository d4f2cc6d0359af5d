//! Bounded FIFO log history.
//!
//! Two independent instances exist per session (monitor and command), each
//! with its own bound and lifetime. The bound holds at all times: every
//! insertion that would exceed it evicts from the head, oldest first.

use std::collections::VecDeque;

use calview_types::LogEntry;

/// A capped FIFO of [`LogEntry`] values.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    max_len: usize,
}

impl LogBuffer {
    /// Create an empty buffer holding at most `max_len` entries.
    pub fn new(max_len: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_len.min(1024)),
            max_len,
        }
    }

    /// Append one entry to the tail, evicting from the head if the bound
    /// would be exceeded.
    pub fn append(&mut self, entry: LogEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.max_len {
            self.entries.pop_front();
        }
    }

    /// Append a batch of entries, equivalent to repeated [`append`].
    ///
    /// Used for the bulk history dump on (re)connect: a dump larger than
    /// the bound keeps only its most recent `max_len` entries.
    ///
    /// [`append`]: Self::append
    pub fn append_bulk(&mut self, entries: impl IntoIterator<Item = LogEntry>) {
        for entry in entries {
            self.append(entry);
        }
    }

    /// A read-only copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Iterate the current contents, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Drop all entries (disconnect / session reset).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The configured bound.
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}
