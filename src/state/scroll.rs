//! Scroll position tracking.
//!
//! Decides whether the view is pinned to the bottom (new lines render
//! immediately) or the user is reading scrollback (new lines are buffered).
//!
//! # Debounce
//!
//! Any user scroll or wheel input marks the view `UserScrolled` at once and
//! (re)arms a single debounce deadline. Only when the deadline passes with no
//! further input is the bottom test repeated; if the view is at the bottom it
//! flips back to `Pinned` and the caller flushes the buffer. Programmatic
//! jump-to-latest bypasses the debounce entirely.

use std::time::{Duration, Instant};

/// Default distance from the bottom still treated as "at bottom".
pub const DEFAULT_BOTTOM_THRESHOLD: usize = 50;

/// Default quiet period after the last scroll input.
pub const DEFAULT_SCROLL_DEBOUNCE: Duration = Duration::from_millis(150);

/// Snapshot of the viewport, in whatever unit the frontend measures
/// (rows in the terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewGeometry {
    /// Total height of the rendered content.
    pub content_height: usize,
    /// Offset of the first visible unit from the top.
    pub scroll_top: usize,
    /// Height of the visible area.
    pub viewport_height: usize,
}

impl ViewGeometry {
    /// Create a geometry snapshot.
    pub fn new(content_height: usize, scroll_top: usize, viewport_height: usize) -> Self {
        Self {
            content_height,
            scroll_top,
            viewport_height,
        }
    }

    /// Distance between the end of the content and the visible-through point.
    pub fn distance_from_bottom(&self) -> usize {
        self.content_height
            .saturating_sub(self.scroll_top.saturating_add(self.viewport_height))
    }

    /// Largest valid `scroll_top`.
    pub fn max_scroll_top(&self) -> usize {
        self.content_height.saturating_sub(self.viewport_height)
    }

    /// Whether the visible-through point is within `threshold` of the end.
    pub fn is_at_bottom(&self, threshold: usize) -> bool {
        self.distance_from_bottom() <= threshold
    }
}

/// Viewport classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollState {
    /// Latest content visible; new lines render and auto-scroll.
    #[default]
    Pinned,
    /// User is reading scrollback; new lines are buffered.
    UserScrolled,
}

/// Where an incoming line should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Decorate and append to the visible log.
    Render,
    /// Hold in the line buffer.
    Buffer,
}

/// Input to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollEvent {
    /// User scrolled or used the wheel; carries geometry after the move.
    UserInteraction(ViewGeometry),
    /// Periodic tick; carries current geometry.
    Tick(ViewGeometry),
    /// Programmatic jump to latest.
    ForceBottom,
}

/// What the caller must do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// Nothing.
    None,
    /// The view is pinned again: flush the buffer into the renderer.
    Flush,
}

/// Pinned / user-scrolled classifier with a single debounce deadline.
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    state: ScrollState,
    threshold: usize,
    debounce: Duration,
    deadline: Option<Instant>,
}

impl ScrollTracker {
    /// Create a pinned tracker.
    pub fn new(threshold: usize, debounce: Duration) -> Self {
        Self {
            state: ScrollState::Pinned,
            threshold,
            debounce,
            deadline: None,
        }
    }

    /// Single entry point for all scroll input.
    pub fn dispatch(&mut self, event: ScrollEvent, now: Instant) -> ScrollOutcome {
        match event {
            ScrollEvent::UserInteraction(_) => {
                self.state = ScrollState::UserScrolled;
                // Last scheduled wins
                self.deadline = Some(now + self.debounce);
                ScrollOutcome::None
            }
            ScrollEvent::Tick(geometry) => match self.deadline {
                Some(deadline) if now >= deadline => {
                    self.deadline = None;
                    if geometry.is_at_bottom(self.threshold) {
                        self.state = ScrollState::Pinned;
                        ScrollOutcome::Flush
                    } else {
                        ScrollOutcome::None
                    }
                }
                _ => ScrollOutcome::None,
            },
            ScrollEvent::ForceBottom => {
                self.deadline = None;
                self.state = ScrollState::Pinned;
                ScrollOutcome::Flush
            }
        }
    }

    /// Route for a line arriving now.
    pub fn route(&self) -> Route {
        match self.state {
            ScrollState::Pinned => Route::Render,
            ScrollState::UserScrolled => Route::Buffer,
        }
    }

    /// Current classification.
    pub fn state(&self) -> ScrollState {
        self.state
    }

    /// Whether the view is pinned.
    pub fn is_pinned(&self) -> bool {
        self.state == ScrollState::Pinned
    }

    /// Pending debounce deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Configured bottom threshold.
    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

impl Default for ScrollTracker {
    fn default() -> Self {
        Self::new(DEFAULT_BOTTOM_THRESHOLD, DEFAULT_SCROLL_DEBOUNCE)
    }
}

#[cfg(test)]
#[path = "scroll_tests.rs"]
mod tests;
