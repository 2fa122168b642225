//! Line buffer for lines that arrive while the user is reading scrollback.
//!
//! A bounded FIFO: the most recent `capacity` unseen lines, oldest dropped
//! first. Flushing drains everything in arrival order.

use crate::model::LogLine;
use std::collections::VecDeque;

/// Default number of unseen lines retained.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1000;

/// Bounded queue of lines awaiting render.
#[derive(Debug)]
pub struct LineBuffer {
    /// Buffered lines (oldest at front, newest at back)
    lines: VecDeque<LogLine>,
    /// Maximum lines to retain
    capacity: usize,
    /// Lines dropped by overflow since the last flush or clear
    dropped: usize,
}

impl LineBuffer {
    /// Create an empty buffer with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(DEFAULT_BUFFER_CAPACITY)),
            capacity,
            dropped: 0,
        }
    }

    /// Append a line at the tail.
    ///
    /// When the buffer is full, the oldest line is evicted and returned. With a
    /// capacity of zero the pushed line itself is returned.
    pub fn push(&mut self, line: LogLine) -> Option<LogLine> {
        if self.capacity == 0 {
            self.dropped += 1;
            return Some(line);
        }

        let evicted = if self.lines.len() >= self.capacity {
            self.dropped += 1;
            self.lines.pop_front()
        } else {
            None
        };
        self.lines.push_back(line);
        evicted
    }

    /// Drain all buffered lines in arrival order, leaving the buffer empty.
    pub fn flush(&mut self) -> Vec<LogLine> {
        self.dropped = 0;
        self.lines.drain(..).collect()
    }

    /// Discard everything without rendering (used by stop).
    pub fn clear(&mut self) {
        self.lines.clear();
        self.dropped = 0;
    }

    /// Number of buffered lines.
    pub fn count(&self) -> usize {
        self.lines.len()
    }

    /// Whether nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lines lost to overflow since the last flush or clear.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Buffered lines (oldest to newest).
    pub fn lines(&self) -> &VecDeque<LogLine> {
        &self.lines
    }

    /// Text of the "N new logs" indicator, or `None` when it should be hidden.
    pub fn indicator(&self) -> Option<String> {
        match self.lines.len() {
            0 => None,
            1 => Some("1 new log".to_string()),
            n => Some(format!("{} new logs", n)),
        }
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}
