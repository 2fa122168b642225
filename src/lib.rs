//! logfeed
//!
//! Terminal client for a device dashboard's live log console. Tails the
//! dashboard's Server-Sent Events log feed, decorates each line (levels,
//! per-source colors, numbers) and keeps a bounded, scrollable view that
//! buffers new lines while the user reads scrollback.
//!
//! Pure Core / Impure Shell: `model`, `decorate`, `state` and
//! `stream::client` are deterministic and driven by explicit events;
//! `stream::transport` and `view` touch the network and the terminal.

pub mod config;
pub mod console;
pub mod decorate;
pub mod logging;
pub mod model;
pub mod state;
pub mod stream;
pub mod view;
