//! Tests for the console controller.

use super::*;
use crate::state::preferences::{MemoryStore, FONT_SIZE_KEY};
use crate::stream::transport::FakeTransport;

const DEBOUNCE: Duration = Duration::from_millis(150);

fn settings() -> ConsoleSettings {
    ConsoleSettings {
        bottom_threshold: 1,
        ..ConsoleSettings::default()
    }
}

fn console() -> Console<FakeTransport, MemoryStore> {
    let mut console = Console::new(FakeTransport::auto_open(), MemoryStore::new(), settings());
    console.set_viewport_height(10);
    console
}

fn open_console(now: Instant) -> Console<FakeTransport, MemoryStore> {
    let mut console = console();
    console.start(now);
    console.tick(now);
    assert_eq!(console.connection_state(), ConnectionState::Open);
    console
}

fn send(console: &mut Console<FakeTransport, MemoryStore>, text: &str, now: Instant) {
    console.transport_mut().push_message(text);
    console.tick(now);
}

fn rendered_texts(console: &Console<FakeTransport, MemoryStore>) -> Vec<String> {
    console
        .rendered()
        .lines()
        .iter()
        .map(|l| l.line().text().to_string())
        .collect()
}

// ===== Lifecycle =====

#[test]
fn new_console_is_stopped_and_pinned() {
    let console = console();
    assert_eq!(console.connection_state(), ConnectionState::Disconnected);
    assert_eq!(console.scroll_state(), ScrollState::Pinned);
    assert!(!console.is_live());
    assert_eq!(console.new_logs_indicator(), None);
    assert!(console.rendered().is_empty());
}

#[test]
fn start_opens_through_transport() {
    let now = Instant::now();
    let console = open_console(now);
    assert_eq!(console.transport().opened().len(), 1);
    assert!(console.is_live());
}

#[test]
fn toggle_stops_and_closes_channel() {
    let now = Instant::now();
    let mut console = open_console(now);
    let id = console.transport().last_opened().unwrap();

    console.toggle(now);

    assert_eq!(console.connection_state(), ConnectionState::Disconnected);
    assert_eq!(console.transport().closed(), &[id]);
    assert!(!console.is_live());
}

#[test]
fn out_of_order_calls_do_not_panic() {
    let now = Instant::now();
    let mut console = console();
    console.stop(now);
    console.force_bottom(now);
    console.user_scrolled(-5, now);
    console.tick(now + DEBOUNCE);
    console.handle_channel_event(ConnectionId::new(42), ChannelEvent::Closed, now);
    assert_eq!(console.connection_state(), ConnectionState::Disconnected);
}

// ===== Autostart =====

#[test]
fn autostart_true_starts_streaming() {
    let transport = FakeTransport::auto_open().with_autostart(Some(true));
    let mut console = Console::new(transport, MemoryStore::new(), settings());

    assert!(console.init_autostart(None, Instant::now()));
    assert_eq!(console.connection_state(), ConnectionState::Connecting);
}

#[test]
fn autostart_failure_stays_stopped() {
    let mut console = Console::new(FakeTransport::new(), MemoryStore::new(), settings());

    assert!(!console.init_autostart(None, Instant::now()));
    assert!(console.transport().opened().is_empty());
}

// ===== Routing =====

#[test]
fn pinned_lines_render_immediately() {
    let now = Instant::now();
    let mut console = open_console(now);

    send(&mut console, "Connected", now);
    send(&mut console, "hello", now);

    assert_eq!(rendered_texts(&console), vec!["Connected", "hello"]);
    assert_eq!(console.new_logs_indicator(), None);
}

#[test]
fn whitespace_lines_are_dropped() {
    let now = Instant::now();
    let mut console = open_console(now);

    send(&mut console, "  ", now);

    assert!(console.rendered().is_empty());
}

#[test]
fn scrolled_lines_are_buffered_then_flushed_in_order() {
    let now = Instant::now();
    let mut console = open_console(now);
    for i in 0..20 {
        send(&mut console, &format!("line {}", i), now);
    }

    console.user_scrolled(-8, now);
    send(&mut console, "late 1", now);
    send(&mut console, "late 2", now);

    assert_eq!(console.rendered().len(), 20);
    assert_eq!(console.new_logs_indicator(), Some("2 new logs".to_string()));

    // Still scrolled up when the debounce expires
    console.tick(now + DEBOUNCE);
    assert_eq!(console.scroll_state(), ScrollState::UserScrolled);

    console.force_bottom(now + DEBOUNCE);
    let texts = rendered_texts(&console);
    assert_eq!(&texts[texts.len() - 2..], &["late 1", "late 2"]);
    assert_eq!(console.new_logs_indicator(), None);
    assert!(console.rendered().geometry().is_at_bottom(0));
}

#[test]
fn scrolling_back_to_bottom_flushes_after_debounce() {
    let now = Instant::now();
    let mut console = open_console(now);
    for i in 0..20 {
        send(&mut console, &format!("line {}", i), now);
    }
    console.user_scrolled(-3, now);
    send(&mut console, "buffered", now);

    console.user_scrolled(3, now + Duration::from_millis(50));
    console.tick(now + Duration::from_millis(100));
    assert_eq!(console.new_logs_indicator(), Some("1 new log".to_string()));

    console.tick(now + Duration::from_millis(200));
    assert_eq!(console.scroll_state(), ScrollState::Pinned);
    assert_eq!(rendered_texts(&console).last().map(String::as_str), Some("buffered"));
}

#[test]
fn stop_clears_buffer_but_keeps_history() {
    let now = Instant::now();
    let mut console = open_console(now);
    for i in 0..15 {
        send(&mut console, &format!("line {}", i), now);
    }
    console.user_scrolled(-5, now);
    send(&mut console, "unseen", now);

    console.stop(now);

    assert_eq!(console.new_logs_indicator(), None);
    assert_eq!(console.rendered().len(), 15);
}

#[test]
fn stale_channel_lines_never_render() {
    let now = Instant::now();
    let mut console = open_console(now);
    let old = console.transport().last_opened().unwrap();
    console.start(now);

    console
        .transport_mut()
        .push(old, ChannelEvent::Message("ghost".to_string()));
    console.tick(now);

    assert!(console.rendered().is_empty());
}

#[test]
fn late_events_from_stopped_channel_are_discarded() {
    let now = Instant::now();
    let mut console = open_console(now);
    let id = console.transport().last_opened().unwrap();

    console.stop(now);
    assert_eq!(console.transport().closed(), &[id]);

    // A reader still blocked on its socket reports after the close
    console
        .transport_mut()
        .push(id, ChannelEvent::Message("late".to_string()));
    console.transport_mut().push(id, ChannelEvent::Closed);
    console.tick(now + Duration::from_secs(5));

    assert!(console.rendered().is_empty());
    assert_eq!(console.connection_state(), ConnectionState::Disconnected);
    assert_eq!(console.transport().opened().len(), 1);
}

// ===== Reconnect =====

#[test]
fn gives_up_after_budget_and_switches_off() {
    let mut now = Instant::now();
    let mut console = Console::new(FakeTransport::new(), MemoryStore::new(), settings());
    console.start(now);

    for _ in 0..6 {
        let id = console.transport().last_opened().unwrap();
        console
            .transport_mut()
            .push(id, ChannelEvent::Error("refused".to_string()));
        console.tick(now);
        now += Duration::from_millis(2000);
        console.tick(now);
    }

    assert_eq!(console.connection_state(), ConnectionState::GivenUp);
    assert!(!console.is_live());
    assert_eq!(console.transport().opened().len(), 6);

    now += Duration::from_secs(60);
    console.tick(now);
    assert_eq!(console.transport().opened().len(), 6);
}

#[test]
fn force_bottom_leaves_connection_alone() {
    let now = Instant::now();
    let mut console = open_console(now);
    let id = console.transport().last_opened().unwrap();
    console.handle_channel_event(id, ChannelEvent::Closed, now);
    assert_eq!(console.connection_state(), ConnectionState::Reconnecting);

    console.force_bottom(now);

    assert_eq!(console.connection_state(), ConnectionState::Reconnecting);
    assert_eq!(console.scroll_state(), ScrollState::Pinned);
}

// ===== Font =====

#[test]
fn font_defaults_by_platform() {
    let mobile = ConsoleSettings {
        platform: Platform::Mobile,
        ..settings()
    };
    let console = Console::new(FakeTransport::new(), MemoryStore::new(), mobile);
    assert_eq!(console.font_size(), 11);
}

#[test]
fn set_font_clamps_and_persists() {
    let mut console = console();

    assert_eq!(console.set_font(3), 8);
    assert_eq!(console.adjust_font(2), 10);
    assert_eq!(console.adjust_font(100), 24);
    assert_eq!(
        console.store().get(FONT_SIZE_KEY).unwrap(),
        Some("24".to_string())
    );
}

#[test]
fn stored_font_is_loaded() {
    let store = MemoryStore::with_value(FONT_SIZE_KEY, "18");
    let console = Console::new(FakeTransport::new(), store, settings());
    assert_eq!(console.font_size(), 18);
}
