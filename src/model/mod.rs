//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod key_action;
pub mod line;

// Re-export for convenience
pub use error::{AppError, DecorateError, PreferenceError, StreamError};
pub use key_action::KeyAction;
pub use line::{DecoratedLine, LevelClass, LineSeq, LogLine, Segment, SegmentClass};
