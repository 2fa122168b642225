//! Console pane widget: the rendered log inside a bordered block.

use crate::model::DecoratedLine;
use crate::state::Renderer;
use crate::stream::ConnectionState;
use crate::view::styles::SegmentStyles;
use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Convert a decorated line into styled spans.
pub fn line_for(decorated: &DecoratedLine, styles: &SegmentStyles) -> Line<'static> {
    let spans: Vec<Span<'static>> = decorated
        .segments()
        .iter()
        .map(|segment| Span::styled(segment.text.clone(), styles.style_for(segment.class)))
        .collect();
    Line::from(spans)
}

/// Dim `HH:MM:SS ` prefix with the line's local arrival time.
pub fn arrival_span(decorated: &DecoratedLine) -> Span<'static> {
    let time = decorated.line().received_at().with_timezone(&Local);
    Span::styled(
        format!("{} ", time.format("%H:%M:%S")),
        Style::default().fg(Color::DarkGray),
    )
}

/// Rows available for log lines inside a pane of `height` rows.
pub fn inner_height(height: u16) -> usize {
    usize::from(height.saturating_sub(2))
}

/// Bordered view of the visible part of the rendered log.
///
/// The title carries the connection state, the font size and the
/// "N new logs" badge when lines are waiting.
pub struct ConsolePane<'a> {
    renderer: &'a Renderer,
    state: ConnectionState,
    font_size: u8,
    new_logs: Option<String>,
    styles: &'a SegmentStyles,
}

impl<'a> ConsolePane<'a> {
    /// Create a new ConsolePane widget.
    pub fn new(
        renderer: &'a Renderer,
        state: ConnectionState,
        font_size: u8,
        new_logs: Option<String>,
        styles: &'a SegmentStyles,
    ) -> Self {
        Self {
            renderer,
            state,
            font_size,
            new_logs,
            styles,
        }
    }

    fn title(&self) -> Line<'static> {
        let mut spans = vec![Span::raw(format!(
            " Console | {} | {}px ",
            self.state.label(),
            self.font_size
        ))];
        if let Some(badge) = &self.new_logs {
            spans.push(Span::styled(
                format!(" {} (End to jump) ", badge),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        Line::from(spans)
    }
}

impl Widget for ConsolePane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_color = match self.state {
            ConnectionState::Open => Color::Green,
            ConnectionState::Connecting | ConnectionState::Reconnecting => Color::Yellow,
            ConnectionState::Disconnected | ConnectionState::GivenUp => Color::Gray,
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(self.title());

        let lines: Vec<Line<'static>> = if self.renderer.is_empty() {
            vec![Line::styled(
                "No logs yet. Press space to start streaming.",
                Style::default().fg(Color::DarkGray),
            )]
        } else {
            self.renderer
                .visible_lines()
                .map(|line| {
                    let mut rendered = line_for(line, self.styles);
                    rendered.spans.insert(0, arrival_span(line));
                    rendered
                })
                .collect()
        };

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
