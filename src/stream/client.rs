//! Connection lifecycle state machine.
//!
//! The client never touches the network. It consumes [`StreamEvent`]s and
//! answers with [`StreamCommand`]s that the console executes against a
//! transport. Every channel gets a fresh [`ConnectionId`]; events tagged with
//! any other id are stale and ignored, so at most one channel ever delivers.
//!
//! # Reconnect budget
//!
//! A failed channel schedules one reconnect after a fixed delay. The attempt
//! counter is bumped when that reconnect fires and reset whenever a channel
//! opens or the user starts/stops explicitly. A failure seen with the counter
//! already at the maximum gives up instead of scheduling.

use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Default delay between a channel failure and the next attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(2000);

/// Default number of consecutive failed reconnects before giving up.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Identity of one push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wrap a raw id.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of the push connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Streaming is off.
    #[default]
    Disconnected,
    /// A channel has been requested but has not opened yet.
    Connecting,
    /// A channel is delivering lines.
    Open,
    /// The channel failed; a reconnect is scheduled.
    Reconnecting,
    /// The reconnect budget ran out; only an explicit start resumes.
    GivenUp,
}

impl ConnectionState {
    /// Short label for status displays.
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "stopped",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "live",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::GivenUp => "gave up",
        }
    }

    /// Whether streaming is switched on (the toggle indicator).
    pub fn is_enabled(self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting | ConnectionState::Open | ConnectionState::Reconnecting
        )
    }
}

/// What a transport reports about one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The server accepted the request and the stream is readable.
    Opened,
    /// One dispatched event payload.
    Message(String),
    /// The stream ended cleanly.
    Closed,
    /// The request or the stream failed.
    Error(String),
}

/// Input to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Explicit start (also an implicit restart when already connected).
    Start,
    /// Explicit stop.
    Stop,
    /// Start when off, stop when on.
    Toggle,
    /// Something happened on a channel.
    Channel(ConnectionId, ChannelEvent),
    /// Periodic timer check.
    Tick,
}

/// Work the caller must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamCommand {
    /// Open a channel with this id.
    Open(ConnectionId),
    /// Close the channel with this id.
    Close(ConnectionId),
    /// Hand one line to the console.
    Deliver(String),
    /// The reconnect budget is exhausted.
    GiveUp,
}

/// Fixed-delay, bounded reconnect settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before each reconnect.
    pub delay: Duration,
    /// Failed reconnects tolerated before giving up.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RECONNECT_DELAY,
            max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
        }
    }
}

/// Push-connection state machine.
#[derive(Debug)]
pub struct StreamClient {
    state: ConnectionState,
    policy: ReconnectPolicy,
    current: Option<ConnectionId>,
    next_id: u64,
    attempts: u32,
    deadline: Option<Instant>,
}

impl StreamClient {
    /// Create a disconnected client.
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            policy,
            current: None,
            next_id: 0,
            attempts: 0,
            deadline: None,
        }
    }

    /// Single entry point for every input.
    pub fn dispatch(&mut self, event: StreamEvent, now: Instant) -> Vec<StreamCommand> {
        match event {
            StreamEvent::Start => self.on_start(),
            StreamEvent::Stop => self.on_stop(),
            StreamEvent::Toggle => {
                if self.state.is_enabled() {
                    self.on_stop()
                } else {
                    self.on_start()
                }
            }
            StreamEvent::Channel(id, event) => self.on_channel(id, event, now),
            StreamEvent::Tick => self.on_tick(now),
        }
    }

    /// Explicit start.
    pub fn start(&mut self, now: Instant) -> Vec<StreamCommand> {
        self.dispatch(StreamEvent::Start, now)
    }

    /// Explicit stop.
    pub fn stop(&mut self, now: Instant) -> Vec<StreamCommand> {
        self.dispatch(StreamEvent::Stop, now)
    }

    /// Toggle streaming.
    pub fn toggle(&mut self, now: Instant) -> Vec<StreamCommand> {
        self.dispatch(StreamEvent::Toggle, now)
    }

    /// Feed a transport event.
    pub fn handle_channel(
        &mut self,
        id: ConnectionId,
        event: ChannelEvent,
        now: Instant,
    ) -> Vec<StreamCommand> {
        self.dispatch(StreamEvent::Channel(id, event), now)
    }

    /// Fire the reconnect timer if due.
    pub fn poll_timer(&mut self, now: Instant) -> Vec<StreamCommand> {
        self.dispatch(StreamEvent::Tick, now)
    }

    fn on_start(&mut self) -> Vec<StreamCommand> {
        let mut commands = Vec::with_capacity(2);
        if let Some(old) = self.current.take() {
            commands.push(StreamCommand::Close(old));
        }
        self.attempts = 0;
        self.deadline = None;
        let id = self.allocate_id();
        info!(connection = %id, "Starting log stream");
        self.state = ConnectionState::Connecting;
        commands.push(StreamCommand::Open(id));
        commands
    }

    fn on_stop(&mut self) -> Vec<StreamCommand> {
        let mut commands = Vec::new();
        if let Some(old) = self.current.take() {
            commands.push(StreamCommand::Close(old));
        }
        if self.state != ConnectionState::Disconnected {
            info!(from = self.state.label(), "Stopping log stream");
        }
        self.attempts = 0;
        self.deadline = None;
        self.state = ConnectionState::Disconnected;
        commands
    }

    fn on_channel(
        &mut self,
        id: ConnectionId,
        event: ChannelEvent,
        now: Instant,
    ) -> Vec<StreamCommand> {
        if self.current != Some(id) {
            debug!(connection = %id, ?event, "Ignoring event from stale channel");
            return Vec::new();
        }

        match event {
            ChannelEvent::Opened => {
                if self.state == ConnectionState::Connecting {
                    info!(connection = %id, "Log stream open");
                    self.state = ConnectionState::Open;
                    self.attempts = 0;
                }
                Vec::new()
            }
            ChannelEvent::Message(payload) => {
                if self.state == ConnectionState::Connecting {
                    // Data implies the channel is open
                    self.state = ConnectionState::Open;
                    self.attempts = 0;
                }
                payload
                    .split('\n')
                    .filter(|line| !line.trim().is_empty())
                    .map(|line| StreamCommand::Deliver(line.to_string()))
                    .collect()
            }
            ChannelEvent::Closed => {
                debug!(connection = %id, "Channel closed by server");
                self.on_failure(id, now)
            }
            ChannelEvent::Error(reason) => {
                warn!(connection = %id, %reason, "Channel error");
                self.on_failure(id, now)
            }
        }
    }

    fn on_failure(&mut self, id: ConnectionId, now: Instant) -> Vec<StreamCommand> {
        self.current = None;
        let mut commands = vec![StreamCommand::Close(id)];

        if self.attempts >= self.policy.max_attempts {
            error!(
                attempts = self.attempts,
                "Reconnect budget exhausted, giving up on log stream"
            );
            self.state = ConnectionState::GivenUp;
            self.deadline = None;
            commands.push(StreamCommand::GiveUp);
        } else {
            debug!(
                attempt = self.attempts + 1,
                delay_ms = self.policy.delay.as_millis() as u64,
                "Scheduling reconnect"
            );
            self.state = ConnectionState::Reconnecting;
            self.deadline = Some(now + self.policy.delay);
        }
        commands
    }

    fn on_tick(&mut self, now: Instant) -> Vec<StreamCommand> {
        match self.deadline {
            Some(deadline) if now >= deadline && self.state == ConnectionState::Reconnecting => {
                self.deadline = None;
                self.attempts += 1;
                let id = self.allocate_id();
                info!(connection = %id, attempt = self.attempts, "Reconnecting log stream");
                self.state = ConnectionState::Connecting;
                vec![StreamCommand::Open(id)]
            }
            _ => Vec::new(),
        }
    }

    fn allocate_id(&mut self) -> ConnectionId {
        self.next_id += 1;
        let id = ConnectionId(self.next_id);
        self.current = Some(id);
        id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Id of the live channel, if any.
    pub fn current(&self) -> Option<ConnectionId> {
        self.current
    }

    /// Reconnects fired since the last open or explicit start/stop.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Pending reconnect deadline.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Active policy.
    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }
}

impl Default for StreamClient {
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
