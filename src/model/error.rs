//! Error types for logfeed.
//!
//! Errors are grouped by the boundary they cross, each a `thiserror` enum that
//! composes upward via `From` so `?` works across layers.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error returned from `main`
//!   - [`StreamError`] - Push-channel and autostart HTTP failures
//!   - [`PreferenceError`] - Local preference store failures
//!   - `std::io::Error` - Terminal failures
//! - [`DecorateError`] - Malformed decoration markup (never leaves the renderer)
//!
//! # Recovery Strategy
//!
//! Almost nothing here is fatal. Transport failures feed the reconnect path,
//! preference failures fall back to defaults, and decoration failures fall back
//! to raw text. Only terminal setup errors end the program.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error.
///
/// Only conditions that stop the program reach this type: terminal setup
/// failures, or configuration that cannot be acted on at all.
#[derive(Debug, Error)]
pub enum AppError {
    /// Stream setup failed in a way the reconnect path cannot absorb
    /// (for example an unparseable base URL).
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// Preference store could not be created.
    #[error("Preference error: {0}")]
    Preference(#[from] PreferenceError),

    /// Terminal or TUI rendering error.
    ///
    /// Fatal: without a working terminal the console cannot function.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Failures talking to the dashboard backend.
///
/// Inside the stream client these are non-fatal: every variant is turned into
/// a channel error event and handled by the bounded reconnect path. The
/// autostart query logs them and treats the answer as `False`.
///
/// # Examples
///
/// ```
/// use logfeed::model::error::StreamError;
///
/// let err = StreamError::Status {
///     url: "http://bjorn.local:8000/stream_logs".to_string(),
///     status: 502,
/// };
/// assert!(err.to_string().contains("502"));
/// ```
#[derive(Debug, Error)]
pub enum StreamError {
    /// The configured base URL cannot be joined with an endpoint path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP request could not be sent or the connection dropped.
    #[error("Request to {url} failed: {reason}")]
    Request {
        /// Endpoint URL.
        url: String,
        /// Underlying client error message.
        reason: String,
    },

    /// The server answered with a non-success status.
    #[error("Request to {url} returned HTTP {status}")]
    Status {
        /// Endpoint URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// Reading the response body failed mid-stream.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reading or writing the local preference store.
///
/// Never fatal: a failed read yields the platform default font size, a failed
/// write is logged and the in-memory preference still changes.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// The store file exists but could not be read.
    #[error("Failed to read preferences at {path}: {source}")]
    Read {
        /// Store file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The store file (or its directory) could not be written.
    #[error("Failed to write preferences at {path}: {source}")]
    Write {
        /// Store file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The store file is not a JSON object of strings.
    #[error("Invalid preferences file {path}: {reason}")]
    Parse {
        /// Store file path.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },
}

/// Decoration produced markup that could not be parsed back into segments.
///
/// Only the renderer sees this; it renders the raw line instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecorateError {
    /// A `<` opened a tag that never closed.
    #[error("Unterminated tag at byte {offset}")]
    UnterminatedTag {
        /// Byte offset of the `<`.
        offset: usize,
    },

    /// A closing tag had no matching opening tag.
    #[error("Unbalanced closing tag at byte {offset}")]
    UnbalancedClose {
        /// Byte offset of the `</`.
        offset: usize,
    },

    /// A span was opened but never closed.
    #[error("{open} span(s) left open at end of line")]
    UnclosedSpan {
        /// Number of spans still open.
        open: usize,
    },

    /// A tag other than `span` appeared.
    #[error("Unsupported tag: {0}")]
    UnsupportedTag(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn stream_error_request_display() {
        let err = StreamError::Request {
            url: "http://host/stream_logs".to_string(),
            reason: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("http://host/stream_logs"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn stream_error_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer");
        let err: StreamError = io_err.into();
        assert!(err.to_string().contains("reset by peer"));
    }

    #[test]
    fn app_error_wraps_stream_error() {
        let err: AppError = StreamError::InvalidUrl("::".to_string()).into();
        assert!(matches!(err, AppError::Stream(StreamError::InvalidUrl(_))));
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn preference_error_parse_display() {
        let err = PreferenceError::Parse {
            path: PathBuf::from("/tmp/prefs.json"),
            reason: "expected value".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/prefs.json"));
        assert!(msg.contains("expected value"));
    }

    #[test]
    fn decorate_error_display() {
        assert_eq!(
            DecorateError::UnterminatedTag { offset: 4 }.to_string(),
            "Unterminated tag at byte 4"
        );
        assert_eq!(
            DecorateError::UnclosedSpan { open: 2 }.to_string(),
            "2 span(s) left open at end of line"
        );
    }
}
