//! Console state machines (pure).
//!
//! Every type here is driven by explicit calls with an injected `Instant`, so
//! all transitions are testable without a terminal or a network.

pub mod buffer;
pub mod preferences;
pub mod renderer;
pub mod scroll;

// Re-export for convenience
pub use buffer::LineBuffer;
pub use preferences::{FileStore, MemoryStore, Platform, PreferenceStore, Preferences};
pub use renderer::Renderer;
pub use scroll::{Route, ScrollEvent, ScrollOutcome, ScrollState, ScrollTracker, ViewGeometry};
