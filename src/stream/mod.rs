//! Push-channel plumbing.
//!
//! [`client`] is the pure lifecycle state machine, [`sse`] the pure frame
//! parser; [`transport`] and [`autostart`] are the HTTP side.

pub mod autostart;
pub mod client;
pub mod sse;
pub mod transport;

pub use client::{
    ChannelEvent, ConnectionId, ConnectionState, ReconnectPolicy, StreamClient, StreamCommand,
    StreamEvent, DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_DELAY,
};
pub use transport::{FakeTransport, HttpTransport, Transport};
