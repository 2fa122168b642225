//! Screen layout: console pane above a one-line status bar.

use crate::console::Console;
use crate::state::PreferenceStore;
use crate::stream::{ConnectionState, Transport};
use crate::view::console_pane::{inner_height, ConsolePane};
use crate::view::live_indicator::LiveIndicator;
use crate::view::styles::SegmentStyles;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Key hints shown in the status bar.
const KEY_HINTS: &str = "space: toggle | s/x: start/stop | +/-: font | End: latest | q: quit";

/// Split the frame into (console pane, status bar).
pub fn split(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Console pane
            Constraint::Length(1), // Status bar (1 line)
        ])
        .split(area);
    (chunks[0], chunks[1])
}

/// Log rows visible for a terminal of `height` rows.
pub fn viewport_height(height: u16) -> usize {
    inner_height(height.saturating_sub(1))
}

/// Render the full screen.
pub fn render_layout<T: Transport, S: PreferenceStore>(
    frame: &mut Frame,
    console: &Console<T, S>,
    blink_on: bool,
    styles: &SegmentStyles,
) {
    let (pane_area, status_area) = split(frame.area());

    let pane = ConsolePane::new(
        console.rendered(),
        console.connection_state(),
        console.font_size(),
        console.new_logs_indicator(),
        styles,
    );
    frame.render_widget(pane, pane_area);

    render_status_bar(frame, status_area, console.connection_state(), blink_on);
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: ConnectionState, blink_on: bool) {
    let mut spans = vec![LiveIndicator::new(state, blink_on).render()];
    if state == ConnectionState::GivenUp {
        spans.push(Span::styled(
            "stream unavailable, press s to retry | ",
            Style::default().fg(Color::Red),
        ));
    }
    spans.push(Span::styled(KEY_HINTS, Style::default().fg(Color::Gray)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
