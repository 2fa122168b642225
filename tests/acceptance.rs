//! Acceptance tests: end-to-end console scenarios over a scripted transport.
//!
//! Each test drives a `Console` only through its public entry points and
//! `FakeTransport`, with explicit timestamps so timers are deterministic.

use logfeed::console::{Console, ConsoleSettings};
use logfeed::model::{LevelClass, SegmentClass};
use logfeed::state::{MemoryStore, ScrollState};
use logfeed::stream::{ChannelEvent, ConnectionState, FakeTransport, DEFAULT_RECONNECT_DELAY};
use std::time::{Duration, Instant};

type TestConsole = Console<FakeTransport, MemoryStore>;

fn settings() -> ConsoleSettings {
    ConsoleSettings {
        bottom_threshold: 1,
        ..ConsoleSettings::default()
    }
}

fn console_with(transport: FakeTransport, settings: ConsoleSettings) -> TestConsole {
    let mut console = Console::new(transport, MemoryStore::new(), settings);
    console.set_viewport_height(10);
    console
}

fn send(console: &mut TestConsole, text: &str, now: Instant) {
    console.transport_mut().push_message(text);
    console.tick(now);
}

fn rendered_texts(console: &TestConsole) -> Vec<String> {
    console
        .rendered()
        .lines()
        .iter()
        .map(|l| l.line().text().to_string())
        .collect()
}

/// Fail the current channel and let the reconnect timer fire.
fn fail_and_wait(console: &mut TestConsole, now: &mut Instant) {
    let id = console.transport().last_opened().unwrap();
    console.transport_mut().push(id, ChannelEvent::Closed);
    console.tick(*now);
    assert_eq!(console.connection_state(), ConnectionState::Reconnecting);

    *now += DEFAULT_RECONNECT_DELAY;
    console.tick(*now);
    assert_eq!(console.connection_state(), ConnectionState::Connecting);
}

// ===== Scenario A: pinned view renders decorated lines =====

#[test]
fn scenario_a_pinned_lines_render_decorated() {
    // GIVEN: a live console pinned to the bottom
    let now = Instant::now();
    let mut console = console_with(FakeTransport::auto_open(), settings());
    console.start(now);
    console.tick(now);
    assert_eq!(console.scroll_state(), ScrollState::Pinned);

    // WHEN: an empty line and two log lines arrive
    for text in ["", "INFO started", "ERROR boom at worker.py line 12"] {
        send(&mut console, text, now);
    }

    // THEN: two entries, the empty line dropped
    assert_eq!(
        rendered_texts(&console),
        vec!["INFO started", "ERROR boom at worker.py line 12"]
    );

    // AND: the second has an ERROR badge, a colored source bubble and a number
    let second = &console.rendered().lines()[1];
    assert!(second.has_class(SegmentClass::Level(LevelClass::Error)));
    assert!(second
        .segments()
        .iter()
        .any(|s| s.text == "worker.py" && matches!(s.class, SegmentClass::Source { .. })));
    assert!(second
        .segments()
        .iter()
        .any(|s| s.text == "12" && s.class == SegmentClass::Number));
    assert_eq!(console.new_logs_indicator(), None);
}

// ===== Scenario B: buffered lines while scrolled back =====

#[test]
fn scenario_b_small_buffer_keeps_newest_and_flushes_in_order() {
    // GIVEN: a buffer of two and a user reading scrollback
    let now = Instant::now();
    let mut console = console_with(
        FakeTransport::auto_open(),
        ConsoleSettings {
            buffer_capacity: 2,
            ..settings()
        },
    );
    console.start(now);
    console.tick(now);
    for i in 0..30 {
        send(&mut console, &format!("history {}", i), now);
    }
    console.user_scrolled(-10, now);
    assert_eq!(console.scroll_state(), ScrollState::UserScrolled);

    // WHEN: three lines arrive
    for text in ["a", "b", "c"] {
        send(&mut console, text, now);
    }

    // THEN: only the newest two are held, nothing new rendered
    let buffered: Vec<&str> = console
        .buffered()
        .lines()
        .iter()
        .map(|l| l.text())
        .collect();
    assert_eq!(buffered, vec!["b", "c"]);
    assert_eq!(
        console.new_logs_indicator(),
        Some("2 new logs".to_string())
    );
    assert_eq!(rendered_texts(&console).last().unwrap(), "history 29");

    // WHEN: the user jumps to the latest line
    console.force_bottom(now);

    // THEN: b then c render, the buffer empties and the indicator hides
    let rendered = rendered_texts(&console);
    assert_eq!(&rendered[rendered.len() - 2..], ["b", "c"]);
    assert!(console.buffered().is_empty());
    assert_eq!(console.new_logs_indicator(), None);
    assert!(console.rendered().geometry().is_at_bottom(0));
}

#[test]
fn scrolling_back_down_flushes_after_quiet_period() {
    let mut now = Instant::now();
    let mut console = console_with(FakeTransport::auto_open(), settings());
    console.start(now);
    console.tick(now);
    for i in 0..30 {
        send(&mut console, &format!("history {}", i), now);
    }

    console.user_scrolled(-10, now);
    send(&mut console, "late", now);
    console.user_scrolled(10, now);

    // Still inside the quiet period
    now += Duration::from_millis(100);
    console.tick(now);
    assert_eq!(console.scroll_state(), ScrollState::UserScrolled);
    assert_eq!(console.buffered().count(), 1);

    now += Duration::from_millis(100);
    console.tick(now);
    assert_eq!(console.scroll_state(), ScrollState::Pinned);
    assert_eq!(rendered_texts(&console).last().unwrap(), "late");
    assert_eq!(console.new_logs_indicator(), None);
}

// ===== Scenario C: reconnect after repeated closes =====

#[test]
fn scenario_c_three_closes_then_success_resets_attempts() {
    // GIVEN: an enabled console whose channel keeps closing
    let mut now = Instant::now();
    let mut console = console_with(FakeTransport::new(), settings());
    console.start(now);

    // WHEN: three connections close in a row
    for expected_attempts in 1..=3 {
        fail_and_wait(&mut console, &mut now);
        assert_eq!(console.reconnect_attempts(), expected_attempts);
    }

    // AND: the fourth connection succeeds
    let id = console.transport().last_opened().unwrap();
    console.transport_mut().push(id, ChannelEvent::Opened);
    console.tick(now);

    // THEN: open, with the counter reset
    assert_eq!(console.connection_state(), ConnectionState::Open);
    assert_eq!(console.reconnect_attempts(), 0);
    assert_eq!(console.transport().opened().len(), 4);
    assert_eq!(console.transport().closed().len(), 3);
    assert!(console.is_live());
}

#[test]
fn reconnect_waits_the_fixed_delay() {
    let mut now = Instant::now();
    let mut console = console_with(FakeTransport::new(), settings());
    console.start(now);

    let id = console.transport().last_opened().unwrap();
    console.transport_mut().push(id, ChannelEvent::Closed);
    console.tick(now);

    now += DEFAULT_RECONNECT_DELAY - Duration::from_millis(1);
    console.tick(now);
    assert_eq!(console.transport().opened().len(), 1);

    now += Duration::from_millis(1);
    console.tick(now);
    assert_eq!(console.transport().opened().len(), 2);
}

// ===== Reconnect budget =====

#[test]
fn five_failed_reconnects_give_up_for_good() {
    let mut now = Instant::now();
    let mut console = console_with(FakeTransport::new(), settings());
    console.start(now);

    for _ in 0..5 {
        fail_and_wait(&mut console, &mut now);
    }
    assert_eq!(console.reconnect_attempts(), 5);

    // The fifth reconnect fails too
    let id = console.transport().last_opened().unwrap();
    console
        .transport_mut()
        .push(id, ChannelEvent::Error("connection refused".to_string()));
    console.tick(now);

    assert_eq!(console.connection_state(), ConnectionState::GivenUp);
    assert!(!console.is_live());

    // No further attempts, however long we wait
    now += Duration::from_secs(600);
    console.tick(now);
    assert_eq!(console.transport().opened().len(), 6);
}

#[test]
fn stop_then_start_resets_attempts_and_retries() {
    let mut now = Instant::now();
    let mut console = console_with(FakeTransport::new(), settings());
    console.start(now);
    fail_and_wait(&mut console, &mut now);
    fail_and_wait(&mut console, &mut now);
    assert_eq!(console.reconnect_attempts(), 2);

    console.stop(now);
    assert_eq!(console.reconnect_attempts(), 0);
    assert_eq!(console.connection_state(), ConnectionState::Disconnected);

    console.start(now);
    assert_eq!(console.reconnect_attempts(), 0);
    assert_eq!(console.connection_state(), ConnectionState::Connecting);
}

#[test]
fn start_after_giving_up_streams_again() {
    let mut now = Instant::now();
    let mut console = console_with(FakeTransport::new(), settings());
    console.start(now);
    for _ in 0..5 {
        fail_and_wait(&mut console, &mut now);
    }
    let id = console.transport().last_opened().unwrap();
    console.transport_mut().push(id, ChannelEvent::Closed);
    console.tick(now);
    assert_eq!(console.connection_state(), ConnectionState::GivenUp);

    console.start(now);
    let id = console.transport().last_opened().unwrap();
    console
        .transport_mut()
        .push(id, ChannelEvent::Message("back online".to_string()));
    console.tick(now);

    assert_eq!(console.connection_state(), ConnectionState::Open);
    assert_eq!(rendered_texts(&console), vec!["back online"]);
}

// ===== Autostart =====

#[test]
fn autostart_answer_decides_initial_state() {
    let now = Instant::now();

    let mut yes = console_with(
        FakeTransport::auto_open().with_autostart(Some(true)),
        settings(),
    );
    assert!(yes.init_autostart(None, now));
    yes.tick(now);
    assert_eq!(yes.connection_state(), ConnectionState::Open);

    let mut no = console_with(
        FakeTransport::auto_open().with_autostart(Some(false)),
        settings(),
    );
    assert!(!no.init_autostart(None, now));
    assert_eq!(no.connection_state(), ConnectionState::Disconnected);

    let mut forced = console_with(
        FakeTransport::auto_open().with_autostart(Some(false)),
        settings(),
    );
    assert!(forced.init_autostart(Some(true), now));
    assert!(forced.is_live());
}

// ===== Multi-line messages =====

#[test]
fn one_message_with_several_lines_renders_each() {
    let now = Instant::now();
    let mut console = console_with(FakeTransport::auto_open(), settings());
    console.start(now);
    console.tick(now);

    send(&mut console, "first\n\n  \nsecond", now);

    assert_eq!(rendered_texts(&console), vec!["first", "second"]);
}
