//! Console controller: the single owner of all console state.
//!
//! Wires the stream client, scroll tracker, line buffer and renderer
//! together and executes the client's commands against a [`Transport`].
//! Every entry point takes the current `Instant`, so the whole console can be
//! driven deterministically in tests; nothing here panics when called out of
//! order.

use crate::model::{LineSeq, LogLine};
use crate::state::buffer::{LineBuffer, DEFAULT_BUFFER_CAPACITY};
use crate::state::preferences::{Platform, PreferenceStore, Preferences};
use crate::state::renderer::{Renderer, DEFAULT_MAX_VISIBLE_LINES};
use crate::state::scroll::{
    Route, ScrollEvent, ScrollOutcome, ScrollState, ScrollTracker, DEFAULT_BOTTOM_THRESHOLD,
    DEFAULT_SCROLL_DEBOUNCE,
};
use crate::stream::autostart::resolve_autostart;
use crate::stream::client::{
    ChannelEvent, ConnectionId, ConnectionState, ReconnectPolicy, StreamClient, StreamCommand,
};
use crate::stream::transport::Transport;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Tunables for one console instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleSettings {
    /// Reconnect delay and budget.
    pub reconnect: ReconnectPolicy,
    /// Capacity of the unseen-lines buffer.
    pub buffer_capacity: usize,
    /// Lines kept in the rendered log.
    pub max_visible_lines: usize,
    /// Distance from the end still counted as "at bottom".
    pub bottom_threshold: usize,
    /// Quiet period after scroll input before re-checking the position.
    pub scroll_debounce: Duration,
    /// Device class for the default font size.
    pub platform: Platform,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            reconnect: ReconnectPolicy::default(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_visible_lines: DEFAULT_MAX_VISIBLE_LINES,
            bottom_threshold: DEFAULT_BOTTOM_THRESHOLD,
            scroll_debounce: DEFAULT_SCROLL_DEBOUNCE,
            platform: Platform::Desktop,
        }
    }
}

/// The live log console.
pub struct Console<T: Transport, S: PreferenceStore> {
    client: StreamClient,
    transport: T,
    store: S,
    scroll: ScrollTracker,
    buffer: LineBuffer,
    renderer: Renderer,
    preferences: Preferences,
    next_seq: u64,
}

impl<T: Transport, S: PreferenceStore> Console<T, S> {
    /// Build a stopped console, loading preferences from `store`.
    pub fn new(transport: T, store: S, settings: ConsoleSettings) -> Self {
        let preferences = Preferences::load(&store, settings.platform);
        debug!(font_size = preferences.font_size(), "Console initialized");
        Self {
            client: StreamClient::new(settings.reconnect),
            transport,
            store,
            scroll: ScrollTracker::new(settings.bottom_threshold, settings.scroll_debounce),
            buffer: LineBuffer::new(settings.buffer_capacity),
            renderer: Renderer::new(settings.max_visible_lines),
            preferences,
            next_seq: 0,
        }
    }

    /// Apply the autostart decision, querying the backend unless overridden.
    ///
    /// Returns whether streaming was started.
    pub fn init_autostart(&mut self, override_: Option<bool>, now: Instant) -> bool {
        let start = resolve_autostart(&mut self.transport, override_);
        if start {
            self.start(now);
        }
        start
    }

    /// Start streaming (restarts an existing channel).
    pub fn start(&mut self, now: Instant) {
        let commands = self.client.start(now);
        self.execute(commands);
    }

    /// Stop streaming, dropping buffered lines. Rendered history stays.
    pub fn stop(&mut self, now: Instant) {
        let commands = self.client.stop(now);
        self.execute(commands);
        self.buffer.clear();
    }

    /// Stop when streaming, start otherwise.
    pub fn toggle(&mut self, now: Instant) {
        if self.client.state().is_enabled() {
            self.stop(now);
        } else {
            self.start(now);
        }
    }

    /// Set the font size (clamped to the allowed range) and persist it.
    pub fn set_font(&mut self, px: i32) -> u8 {
        let applied = self.preferences.set_font_size(&mut self.store, px);
        info!(font_size = applied, "Font size changed");
        applied
    }

    /// Grow or shrink the font by `delta`.
    pub fn adjust_font(&mut self, delta: i32) -> u8 {
        let current = i32::from(self.preferences.font_size());
        self.set_font(current.saturating_add(delta))
    }

    /// Jump to the newest line, flushing anything buffered.
    ///
    /// Independent of the connection: works while reconnecting or stopped.
    pub fn force_bottom(&mut self, now: Instant) {
        let outcome = self.scroll.dispatch(ScrollEvent::ForceBottom, now);
        self.apply_scroll_outcome(outcome);
        self.renderer.scroll_to_bottom();
    }

    /// Feed one transport event.
    pub fn handle_channel_event(&mut self, id: ConnectionId, event: ChannelEvent, now: Instant) {
        let commands = self.client.handle_channel(id, event, now);
        self.execute(commands);
    }

    /// User moved the view by `delta` lines (negative is up).
    pub fn user_scrolled(&mut self, delta: isize, now: Instant) {
        self.renderer.scroll_by(delta);
        self.scroll
            .dispatch(ScrollEvent::UserInteraction(self.renderer.geometry()), now);
    }

    /// User jumped to the oldest retained line.
    pub fn user_scrolled_to_top(&mut self, now: Instant) {
        self.renderer.scroll_to_top();
        self.scroll
            .dispatch(ScrollEvent::UserInteraction(self.renderer.geometry()), now);
    }

    /// Periodic work: drain the transport, fire due timers.
    pub fn tick(&mut self, now: Instant) {
        for (id, event) in self.transport.poll() {
            self.handle_channel_event(id, event, now);
        }

        let commands = self.client.poll_timer(now);
        self.execute(commands);

        let outcome = self
            .scroll
            .dispatch(ScrollEvent::Tick(self.renderer.geometry()), now);
        self.apply_scroll_outcome(outcome);
    }

    /// Resize the viewport, staying at the bottom when pinned.
    pub fn set_viewport_height(&mut self, height: usize) {
        self.renderer.set_viewport_height(height);
        if self.scroll.is_pinned() {
            self.renderer.scroll_to_bottom();
        }
    }

    fn execute(&mut self, commands: Vec<StreamCommand>) {
        for command in commands {
            match command {
                StreamCommand::Open(id) => self.transport.open(id),
                StreamCommand::Close(id) => self.transport.close(id),
                StreamCommand::Deliver(text) => self.deliver(text),
                StreamCommand::GiveUp => {
                    error!("Log stream unavailable, console switched off");
                }
            }
        }
    }

    fn deliver(&mut self, text: String) {
        let Some(line) = LogLine::new(LineSeq::new(self.next_seq), text) else {
            return;
        };
        self.next_seq += 1;

        match self.scroll.route() {
            Route::Render => {
                self.renderer.append(line, true);
            }
            Route::Buffer => {
                if let Some(dropped) = self.buffer.push(line) {
                    debug!(seq = dropped.seq().get(), "Buffer full, dropped oldest line");
                }
            }
        }
    }

    fn apply_scroll_outcome(&mut self, outcome: ScrollOutcome) {
        if outcome == ScrollOutcome::Flush {
            let lines = self.buffer.flush();
            if !lines.is_empty() {
                debug!(count = lines.len(), "Flushing buffered lines");
            }
            self.renderer.extend(lines, true);
        }
    }

    /// Lifecycle state of the push connection.
    pub fn connection_state(&self) -> ConnectionState {
        self.client.state()
    }

    /// Pinned or user-scrolled.
    pub fn scroll_state(&self) -> ScrollState {
        self.scroll.state()
    }

    /// Whether the streaming toggle is on.
    pub fn is_live(&self) -> bool {
        self.client.state().is_enabled()
    }

    /// "N new logs" text, hidden when nothing is buffered.
    pub fn new_logs_indicator(&self) -> Option<String> {
        self.buffer.indicator()
    }

    /// The rendered log and its view position.
    pub fn rendered(&self) -> &Renderer {
        &self.renderer
    }

    /// Lines waiting for the view to return to the bottom.
    pub fn buffered(&self) -> &LineBuffer {
        &self.buffer
    }

    /// Current font size.
    pub fn font_size(&self) -> u8 {
        self.preferences.font_size()
    }

    /// Reconnect attempts since the last open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.client.attempts()
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Underlying transport, mutably (tests script events through this).
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Underlying preference store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
#[path = "console_tests.rs"]
mod tests;
