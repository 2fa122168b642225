//! LIVE indicator widget for the status bar.
//!
//! - Blinking green while the channel is open
//! - Yellow while connecting or waiting to reconnect
//! - Gray when stopped or after giving up

use crate::stream::ConnectionState;
use ratatui::{
    style::{Color, Style},
    text::Span,
};

/// Text content for the LIVE indicator.
const LIVE_INDICATOR_PREFIX: &str = "[LIVE] ";

/// LIVE indicator widget that renders based on connection state and blink state.
///
/// The widget is stateless: the blink phase is toggled by the event loop's
/// timer and passed in.
///
/// # Examples
///
/// ```rust
/// use logfeed::view::live_indicator::LiveIndicator;
/// use logfeed::stream::ConnectionState;
///
/// let stopped = LiveIndicator::new(ConnectionState::Disconnected, true);
/// assert_eq!(stopped.render().content, "[LIVE] ");
///
/// let hidden = LiveIndicator::new(ConnectionState::Open, false);
/// assert_eq!(hidden.render().content, "");
/// ```
#[derive(Debug, Clone)]
pub struct LiveIndicator {
    state: ConnectionState,
    blink_on: bool,
}

impl LiveIndicator {
    /// Create a new LiveIndicator with the given state and blink phase.
    pub fn new(state: ConnectionState, blink_on: bool) -> Self {
        Self { state, blink_on }
    }

    /// Render the indicator as a ratatui Span.
    ///
    /// Only the open state blinks; with `blink_on=false` it renders empty.
    pub fn render(&self) -> Span<'static> {
        match self.state {
            ConnectionState::Disconnected | ConnectionState::GivenUp => {
                Span::styled(LIVE_INDICATOR_PREFIX, Style::default().fg(Color::Gray))
            }
            ConnectionState::Connecting | ConnectionState::Reconnecting => {
                Span::styled(LIVE_INDICATOR_PREFIX, Style::default().fg(Color::Yellow))
            }
            ConnectionState::Open => {
                if self.blink_on {
                    Span::styled(LIVE_INDICATOR_PREFIX, Style::default().fg(Color::Green))
                } else {
                    Span::raw("")
                }
            }
        }
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "live_indicator_tests.rs"]
mod tests;
