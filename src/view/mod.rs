//! TUI rendering and terminal management (impure shell)

pub mod console_pane;
pub mod layout;
pub mod live_indicator;
pub mod styles;

pub use console_pane::ConsolePane;
pub use live_indicator::LiveIndicator;
pub use styles::{ColorConfig, SegmentStyles};

use crate::config::keybindings::KeyBindings;
use crate::console::Console;
use crate::model::{AppError, KeyAction};
use crate::state::PreferenceStore;
use crate::stream::Transport;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Loop tick: transport drain, reconnect and debounce timers.
const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// LIVE indicator blink period.
const BLINK_INTERVAL: Duration = Duration::from_millis(500);

/// Lines moved per mouse wheel notch.
const WHEEL_LINES: isize = 3;

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// Application error
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B, T, S>
where
    B: ratatui::backend::Backend,
    T: Transport,
    S: PreferenceStore,
{
    terminal: Terminal<B>,
    console: Console<T, S>,
    key_bindings: KeyBindings,
    styles: SegmentStyles,
    blink_on: bool,
    last_blink: Instant,
}

impl<T: Transport, S: PreferenceStore> TuiApp<CrosstermBackend<Stdout>, T, S> {
    /// Create and initialize a new TUI application
    ///
    /// Sets up terminal in raw mode with alternate screen
    pub fn new(console: Console<T, S>, colors: ColorConfig) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(crossterm::event::EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self::with_terminal(
            terminal,
            console,
            KeyBindings::default(),
            colors,
        ))
    }

    /// Run the main event loop
    ///
    /// Returns when user quits (q or Ctrl+C). Every turn drains the
    /// transport and fires due timers, then redraws.
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.draw()?;

        loop {
            if event::poll(TICK_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key) {
                            return Ok(()); // User quit
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(width, height) => self.handle_resize(width, height),
                    _ => {}
                }
            }

            self.on_tick(Instant::now());
            self.draw()?;
        }
    }
}

impl<B, T, S> TuiApp<B, T, S>
where
    B: ratatui::backend::Backend,
    T: Transport,
    S: PreferenceStore,
{
    /// Wrap an already-initialized terminal.
    pub fn with_terminal(
        terminal: Terminal<B>,
        mut console: Console<T, S>,
        key_bindings: KeyBindings,
        colors: ColorConfig,
    ) -> Self {
        let height = terminal.size().map(|size| size.height).unwrap_or(24);
        console.set_viewport_height(layout::viewport_height(height));
        Self {
            terminal,
            console,
            key_bindings,
            styles: SegmentStyles::with_color_config(colors),
            blink_on: true,
            last_blink: Instant::now(),
        }
    }

    /// Timer work: console tick plus LIVE blink.
    fn on_tick(&mut self, now: Instant) {
        self.console.tick(now);
        if now.duration_since(self.last_blink) >= BLINK_INTERVAL {
            self.blink_on = !self.blink_on;
            self.last_blink = now;
        }
    }

    /// Handle a single keyboard event
    ///
    /// Returns true if app should quit
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        // Windows reports releases too
        if key.kind == KeyEventKind::Release {
            return false;
        }

        let Some(action) = self.key_bindings.get(key) else {
            return false; // Unknown key, ignore
        };

        let now = Instant::now();
        let page = self.page_size();
        match action {
            KeyAction::Quit => return true,
            KeyAction::ToggleStreaming => self.console.toggle(now),
            KeyAction::Start => self.console.start(now),
            KeyAction::Stop => self.console.stop(now),
            KeyAction::ScrollUp => self.console.user_scrolled(-1, now),
            KeyAction::ScrollDown => self.console.user_scrolled(1, now),
            KeyAction::PageUp => self.console.user_scrolled(-page, now),
            KeyAction::PageDown => self.console.user_scrolled(page, now),
            KeyAction::ScrollToTop => self.console.user_scrolled_to_top(now),
            KeyAction::JumpToLatest => self.console.force_bottom(now),
            KeyAction::FontLarger => {
                self.console.adjust_font(1);
            }
            KeyAction::FontSmaller => {
                self.console.adjust_font(-1);
            }
        }
        false
    }

    /// Mouse wheel counts as user scrolling.
    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let now = Instant::now();
        match mouse.kind {
            MouseEventKind::ScrollUp => self.console.user_scrolled(-WHEEL_LINES, now),
            MouseEventKind::ScrollDown => self.console.user_scrolled(WHEEL_LINES, now),
            _ => {}
        }
    }

    /// A layout change re-pins the view to the newest line.
    fn handle_resize(&mut self, width: u16, height: u16) {
        debug!("Handling resize to {}x{}", width, height);
        self.console
            .set_viewport_height(layout::viewport_height(height));
        self.console.force_bottom(Instant::now());
    }

    fn page_size(&self) -> isize {
        let height = self.console.rendered().geometry().viewport_height;
        height.saturating_sub(1).max(1) as isize
    }

    /// Render the current frame
    fn draw(&mut self) -> Result<(), TuiError> {
        let Self {
            terminal,
            console,
            styles,
            blink_on,
            ..
        } = self;
        terminal.draw(|frame| {
            layout::render_layout(frame, console, *blink_on, styles);
        })?;
        Ok(())
    }

    /// The console driven by this app.
    pub fn console(&self) -> &Console<T, S> {
        &self.console
    }

    /// The console, mutably.
    pub fn console_mut(&mut self) -> &mut Console<T, S> {
        &mut self.console
    }
}

/// Initialize the terminal, run the console until quit, and restore.
pub fn run_console<T: Transport, S: PreferenceStore>(
    console: Console<T, S>,
    colors: ColorConfig,
) -> Result<(), TuiError> {
    let mut app = TuiApp::new(console, colors)?;

    // Run the app and ensure cleanup happens even on error
    let result = app.run();

    // Always restore terminal state
    restore_terminal()?;

    result
}

/// Restore terminal to normal state
///
/// Disables raw mode, mouse capture, and leaves alternate screen
pub fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(crossterm::event::DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
#[path = "tui_tests.rs"]
mod tests;
