//! Visible log: decorated lines with a retention cap and a scroll offset.

use crate::decorate::{Decorate, LineDecorator};
use crate::model::{DecoratedLine, LogLine};
use crate::state::scroll::ViewGeometry;
use std::collections::VecDeque;
use tracing::warn;

/// Default number of decorated lines kept in the view.
pub const DEFAULT_MAX_VISIBLE_LINES: usize = 200;

/// Decorates, retains and positions the rendered log.
///
/// One line of content is one unit of height; the frontend does not wrap.
#[derive(Debug)]
pub struct Renderer {
    decorator: Box<dyn Decorate>,
    /// Rendered lines (oldest at front, newest at back)
    lines: VecDeque<DecoratedLine>,
    max_visible: usize,
    scroll_top: usize,
    viewport_height: usize,
}

impl Renderer {
    /// Create an empty renderer retaining at most `max_visible` lines.
    ///
    /// A cap of zero is raised to one so the newest line is always kept.
    pub fn new(max_visible: usize) -> Self {
        Self::with_decorator(max_visible, LineDecorator::new())
    }

    /// Create an empty renderer with a custom decorator.
    pub fn with_decorator(max_visible: usize, decorator: impl Decorate + 'static) -> Self {
        let max_visible = max_visible.max(1);
        Self {
            decorator: Box::new(decorator),
            lines: VecDeque::with_capacity(max_visible.min(DEFAULT_MAX_VISIBLE_LINES)),
            max_visible,
            scroll_top: 0,
            viewport_height: 0,
        }
    }

    /// Decorate and append a line.
    ///
    /// Decoration failures fall back to the raw text. Lines beyond the cap are
    /// evicted from the oldest end. When `pinned`, the view moves to the
    /// bottom; otherwise the offset is shifted so the same lines stay in view.
    ///
    /// Returns the number of evicted lines.
    pub fn append(&mut self, line: LogLine, pinned: bool) -> usize {
        let decorated = match self.decorator.decorate(&line) {
            Ok(decorated) => decorated,
            Err(error) => {
                warn!(seq = line.seq().get(), %error, "Decoration failed, rendering raw line");
                DecoratedLine::plain(line)
            }
        };
        self.lines.push_back(decorated);

        let mut evicted = 0;
        while self.lines.len() > self.max_visible {
            self.lines.pop_front();
            evicted += 1;
        }

        if pinned {
            self.scroll_to_bottom();
        } else {
            self.scroll_top = self.scroll_top.saturating_sub(evicted);
        }
        evicted
    }

    /// Append several lines in order.
    pub fn extend<I>(&mut self, lines: I, pinned: bool)
    where
        I: IntoIterator<Item = LogLine>,
    {
        for line in lines {
            self.append(line, pinned);
        }
    }

    /// Move the view by `delta` units, clamped to the content.
    pub fn scroll_by(&mut self, delta: isize) {
        let target = if delta.is_negative() {
            self.scroll_top.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll_top.saturating_add(delta.unsigned_abs())
        };
        self.scroll_top = target.min(self.geometry().max_scroll_top());
    }

    /// Move the view to the first line.
    pub fn scroll_to_top(&mut self) {
        self.scroll_top = 0;
    }

    /// Move the view so the newest line is visible.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.geometry().max_scroll_top();
    }

    /// Update the visible height, keeping the offset valid.
    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height;
        self.scroll_top = self.scroll_top.min(self.geometry().max_scroll_top());
    }

    /// Current geometry.
    pub fn geometry(&self) -> ViewGeometry {
        ViewGeometry::new(self.lines.len(), self.scroll_top, self.viewport_height)
    }

    /// All retained lines (oldest to newest).
    pub fn lines(&self) -> &VecDeque<DecoratedLine> {
        &self.lines
    }

    /// Lines inside the viewport.
    pub fn visible_lines(&self) -> impl Iterator<Item = &DecoratedLine> {
        self.lines
            .iter()
            .skip(self.scroll_top)
            .take(self.viewport_height)
    }

    /// Number of retained lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether nothing has been rendered.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Retention cap.
    pub fn max_visible(&self) -> usize {
        self.max_visible
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VISIBLE_LINES)
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
