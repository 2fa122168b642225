//! Domain-level keyboard actions independent of key bindings.

/// What the user asked the console to do.
///
/// These represent intent, not specific keys. The mapping from
/// `crossterm::event::KeyEvent` to `KeyAction` is handled by `KeyBindings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    // Streaming
    /// Start when stopped, stop when streaming. Default: Space
    ToggleStreaming,
    /// Start (or restart) streaming. Default: s
    Start,
    /// Stop streaming. Default: x
    Stop,

    // Scrolling (user interaction)
    /// Scroll up one line. Default: k/↑
    ScrollUp,
    /// Scroll down one line. Default: j/↓
    ScrollDown,
    /// Scroll up one page. Default: Page Up/Ctrl+u
    PageUp,
    /// Scroll down one page. Default: Page Down/Ctrl+d
    PageDown,
    /// Jump to the oldest retained line. Default: g/Home
    ScrollToTop,
    /// Jump to the newest line and resume following. Default: G/End
    JumpToLatest,

    // Presentation
    /// Increase the font size by one. Default: +/=
    FontLarger,
    /// Decrease the font size by one. Default: -
    FontSmaller,

    // Application
    /// Exit. Default: q/Ctrl+c
    Quit,
}

impl KeyAction {
    /// Whether the action moves the view under the user's control.
    pub fn is_user_scroll(self) -> bool {
        matches!(
            self,
            KeyAction::ScrollUp
                | KeyAction::ScrollDown
                | KeyAction::PageUp
                | KeyAction::PageDown
                | KeyAction::ScrollToTop
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_actions_are_user_scrolls() {
        assert!(KeyAction::ScrollUp.is_user_scroll());
        assert!(KeyAction::PageDown.is_user_scroll());
        assert!(KeyAction::ScrollToTop.is_user_scroll());
    }

    #[test]
    fn jump_to_latest_is_not_a_user_scroll() {
        // Programmatic jump bypasses the debounce
        assert!(!KeyAction::JumpToLatest.is_user_scroll());
        assert!(!KeyAction::ToggleStreaming.is_user_scroll());
    }
}
