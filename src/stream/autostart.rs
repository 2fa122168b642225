//! Autostart decision.
//!
//! The dashboard answers `GET /check_console_autostart` with the literal
//! `True` or `False`. Anything that is not exactly `True` after trimming,
//! including a failed query, means "do not start".

use crate::stream::transport::Transport;
use tracing::{info, warn};

/// Interpret the autostart endpoint's body.
///
/// # Examples
///
/// ```
/// use logfeed::stream::autostart::parse_autostart;
///
/// assert!(parse_autostart("True\n"));
/// assert!(!parse_autostart("true"));
/// ```
pub fn parse_autostart(body: &str) -> bool {
    body.trim() == "True"
}

/// Resolve whether to start streaming on load.
///
/// An explicit override skips the query entirely.
pub fn resolve_autostart<T: Transport>(transport: &mut T, override_: Option<bool>) -> bool {
    if let Some(answer) = override_ {
        info!(autostart = answer, "Autostart set by configuration");
        return answer;
    }
    match transport.autostart() {
        Ok(answer) => {
            info!(autostart = answer, "Autostart queried");
            answer
        }
        Err(error) => {
            warn!(%error, "Autostart query failed, not starting");
            false
        }
    }
}
