//! Incremental Server-Sent Events parser.
//!
//! Fed one line at a time (line terminator already stripped). Only the
//! `data` field matters for the log feed; `event`, `id` and `retry` are
//! accepted and ignored. Comment lines (leading `:`) are heartbeats.

/// Accumulates `data:` lines until a blank line dispatches the event.
#[derive(Debug, Default)]
pub struct SseParser {
    data: Vec<String>,
}

impl SseParser {
    /// Create an empty parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one line. Returns the event payload when `line` ends an event.
    ///
    /// Multiple `data:` lines of one event are joined with `\n`. An event
    /// with no data lines dispatches nothing.
    pub fn feed_line(&mut self, line: &str) -> Option<String> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.is_empty() {
            if self.data.is_empty() {
                return None;
            }
            let payload = self.data.join("\n");
            self.data.clear();
            return Some(payload);
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
        None
    }

    /// Whether an event is partially accumulated.
    pub fn has_pending(&self) -> bool {
        !self.data.is_empty()
    }

    /// Drop any partial event (end of stream).
    pub fn reset(&mut self) {
        self.data.clear();
    }
}
