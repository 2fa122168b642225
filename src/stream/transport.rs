//! Transports: the impure side of the stream client.
//!
//! A [`Transport`] opens and closes channels on request and reports what
//! happened on them as `(ConnectionId, ChannelEvent)` pairs, drained by the
//! console once per loop turn.

use crate::model::StreamError;
use crate::stream::autostart::parse_autostart;
use crate::stream::client::{ChannelEvent, ConnectionId};
use crate::stream::sse::SseParser;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::Url;
use std::collections::{HashMap, VecDeque};
use std::io::{BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Streaming endpoint path.
pub const STREAM_PATH: &str = "stream_logs";

/// Autostart endpoint path.
pub const AUTOSTART_PATH: &str = "check_console_autostart";

/// Connect timeout for both endpoints.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Whole-request timeout for the autostart query.
const AUTOSTART_TIMEOUT: Duration = Duration::from_secs(5);

/// Backend the console talks to.
pub trait Transport {
    /// Begin opening a channel. Outcome arrives later through [`poll`](Self::poll).
    fn open(&mut self, id: ConnectionId);

    /// Close a channel. Events it produces afterwards may still be polled and
    /// are discarded by id.
    ///
    /// Closing is a request, not a teardown. [`HttpTransport`] only signals
    /// the reader: its blocking read, thread and socket live on until the
    /// server sends its next line or heartbeat (or the connection drops).
    /// Nothing from a closed id is delivered in the meantime.
    fn close(&mut self, id: ConnectionId);

    /// Drain everything reported since the last call, in order.
    fn poll(&mut self) -> Vec<(ConnectionId, ChannelEvent)>;

    /// Ask the backend whether streaming should start on load.
    fn autostart(&mut self) -> Result<bool, StreamError>;
}

/// Join `path` onto `base`, treating `base` as a directory.
///
/// # Examples
///
/// ```
/// use logfeed::stream::transport::endpoint;
///
/// let url = endpoint("http://bjorn.local:8000", "stream_logs").unwrap();
/// assert_eq!(url.as_str(), "http://bjorn.local:8000/stream_logs");
/// ```
pub fn endpoint(base: &str, path: &str) -> Result<Url, StreamError> {
    let mut base = base.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    let base = Url::parse(&base).map_err(|e| StreamError::InvalidUrl(format!("{}: {}", base, e)))?;
    match base.scheme() {
        "http" | "https" => {}
        other => {
            return Err(StreamError::InvalidUrl(format!(
                "{}: unsupported scheme {}",
                base, other
            )))
        }
    }
    base.join(path)
        .map_err(|e| StreamError::InvalidUrl(format!("{}{}: {}", base, path, e)))
}

struct Reader {
    cancel: Arc<AtomicBool>,
}

/// SSE over HTTP, one reader thread per channel.
pub struct HttpTransport {
    client: Client,
    stream_url: Url,
    autostart_url: Url,
    sender: Sender<(ConnectionId, ChannelEvent)>,
    receiver: Receiver<(ConnectionId, ChannelEvent)>,
    readers: HashMap<ConnectionId, Reader>,
}

impl HttpTransport {
    /// Transport for the dashboard at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, StreamError> {
        let stream_url = endpoint(base_url, STREAM_PATH)?;
        let autostart_url = endpoint(base_url, AUTOSTART_PATH)?;
        // No overall timeout: the stream stays open indefinitely
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None)
            .build()
            .map_err(|e| StreamError::Request {
                url: stream_url.to_string(),
                reason: e.to_string(),
            })?;
        let (sender, receiver) = mpsc::channel();
        Ok(Self {
            client,
            stream_url,
            autostart_url,
            sender,
            receiver,
            readers: HashMap::new(),
        })
    }

    /// Streaming endpoint URL.
    pub fn stream_url(&self) -> &Url {
        &self.stream_url
    }
}

impl Transport for HttpTransport {
    fn open(&mut self, id: ConnectionId) {
        let cancel = Arc::new(AtomicBool::new(false));
        let reader_cancel = Arc::clone(&cancel);
        let client = self.client.clone();
        let url = self.stream_url.clone();
        let sender = self.sender.clone();

        let spawned = thread::Builder::new()
            .name(format!("logfeed-stream-{}", id.get()))
            .spawn(move || read_stream(client, url, id, sender, reader_cancel));
        match spawned {
            Ok(_) => {
                self.readers.insert(id, Reader { cancel });
            }
            Err(e) => {
                warn!(connection = %id, error = %e, "Failed to spawn stream reader");
                let _ = self
                    .sender
                    .send((id, ChannelEvent::Error(format!("spawn failed: {}", e))));
            }
        }
    }

    // The reader notices the flag after its current blocking read returns.
    fn close(&mut self, id: ConnectionId) {
        if let Some(reader) = self.readers.remove(&id) {
            // Reader exits at its next line; its events are stale by then
            reader.cancel.store(true, Ordering::Relaxed);
            debug!(connection = %id, "Stream reader cancelled");
        }
    }

    fn poll(&mut self) -> Vec<(ConnectionId, ChannelEvent)> {
        let events: Vec<_> = self.receiver.try_iter().collect();
        for (id, event) in &events {
            if matches!(event, ChannelEvent::Closed | ChannelEvent::Error(_)) {
                self.readers.remove(id);
            }
        }
        events
    }

    fn autostart(&mut self) -> Result<bool, StreamError> {
        let url = self.autostart_url.to_string();
        let response = self
            .client
            .get(self.autostart_url.clone())
            .timeout(AUTOSTART_TIMEOUT)
            .send()
            .map_err(|e| StreamError::Request {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let body = response.text().map_err(|e| StreamError::Request {
            url,
            reason: e.to_string(),
        })?;
        Ok(parse_autostart(&body))
    }
}

impl Drop for HttpTransport {
    fn drop(&mut self) {
        for reader in self.readers.values() {
            reader.cancel.store(true, Ordering::Relaxed);
        }
    }
}

fn read_stream(
    client: Client,
    url: Url,
    id: ConnectionId,
    sender: Sender<(ConnectionId, ChannelEvent)>,
    cancel: Arc<AtomicBool>,
) {
    let send = |event: ChannelEvent| sender.send((id, event)).is_ok();

    let response = match client
        .get(url.clone())
        .header(ACCEPT, "text/event-stream")
        .header(CACHE_CONTROL, "no-cache")
        .send()
    {
        Ok(response) => response,
        Err(e) => {
            let err = StreamError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            };
            send(ChannelEvent::Error(err.to_string()));
            return;
        }
    };

    let status = response.status();
    if !status.is_success() {
        let err = StreamError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        };
        send(ChannelEvent::Error(err.to_string()));
        return;
    }

    if cancel.load(Ordering::Relaxed) || !send(ChannelEvent::Opened) {
        return;
    }

    let mut parser = SseParser::new();
    for line in BufReader::new(response).lines() {
        if cancel.load(Ordering::Relaxed) {
            return;
        }
        match line {
            Ok(line) => {
                if let Some(payload) = parser.feed_line(&line) {
                    if !send(ChannelEvent::Message(payload)) {
                        return;
                    }
                }
            }
            Err(e) => {
                send(ChannelEvent::Error(StreamError::Io(e).to_string()));
                return;
            }
        }
    }

    if !cancel.load(Ordering::Relaxed) {
        send(ChannelEvent::Closed);
    }
}

/// Scripted transport for tests and offline use.
///
/// Records every open and close. Events are queued with
/// [`push`](Self::push) and handed out on the next poll.
#[derive(Debug, Default)]
pub struct FakeTransport {
    opened: Vec<ConnectionId>,
    closed: Vec<ConnectionId>,
    pending: VecDeque<(ConnectionId, ChannelEvent)>,
    autostart: Option<bool>,
    open_immediately: bool,
}

impl FakeTransport {
    /// Transport that reports nothing until told to.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose channels report `Opened` as soon as they are opened.
    pub fn auto_open() -> Self {
        Self {
            open_immediately: true,
            ..Self::default()
        }
    }

    /// Set the autostart answer; `None` makes the query fail.
    pub fn with_autostart(mut self, answer: Option<bool>) -> Self {
        self.autostart = answer;
        self
    }

    /// Queue an event for the next poll.
    pub fn push(&mut self, id: ConnectionId, event: ChannelEvent) {
        self.pending.push_back((id, event));
    }

    /// Queue a message on the most recently opened channel.
    pub fn push_message(&mut self, text: &str) {
        if let Some(id) = self.last_opened() {
            self.push(id, ChannelEvent::Message(text.to_string()));
        }
    }

    /// Every id opened so far.
    pub fn opened(&self) -> &[ConnectionId] {
        &self.opened
    }

    /// Every id closed so far.
    pub fn closed(&self) -> &[ConnectionId] {
        &self.closed
    }

    /// Most recently opened id.
    pub fn last_opened(&self) -> Option<ConnectionId> {
        self.opened.last().copied()
    }
}

impl Transport for FakeTransport {
    fn open(&mut self, id: ConnectionId) {
        self.opened.push(id);
        if self.open_immediately {
            self.pending.push_back((id, ChannelEvent::Opened));
        }
    }

    fn close(&mut self, id: ConnectionId) {
        self.closed.push(id);
    }

    fn poll(&mut self) -> Vec<(ConnectionId, ChannelEvent)> {
        self.pending.drain(..).collect()
    }

    fn autostart(&mut self) -> Result<bool, StreamError> {
        self.autostart.ok_or_else(|| StreamError::Request {
            url: AUTOSTART_PATH.to_string(),
            reason: "no autostart answer scripted".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_with_or_without_trailing_slash() {
        let a = endpoint("http://host:8000", STREAM_PATH).unwrap();
        let b = endpoint("http://host:8000/", STREAM_PATH).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "http://host:8000/stream_logs");
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let url = endpoint("https://host/bjorn", AUTOSTART_PATH).unwrap();
        assert_eq!(url.as_str(), "https://host/bjorn/check_console_autostart");
    }

    #[test]
    fn endpoint_rejects_garbage_and_other_schemes() {
        assert!(matches!(
            endpoint("not a url", STREAM_PATH),
            Err(StreamError::InvalidUrl(_))
        ));
        assert!(matches!(
            endpoint("ftp://host", STREAM_PATH),
            Err(StreamError::InvalidUrl(_))
        ));
    }

    #[test]
    fn http_transport_rejects_invalid_base() {
        assert!(HttpTransport::new("::").is_err());
    }

    #[test]
    fn fake_transport_records_and_replays() {
        let mut transport = FakeTransport::auto_open();
        let id = ConnectionId::new(1);
        transport.open(id);
        transport.push_message("hello");
        transport.close(id);

        assert_eq!(transport.opened(), &[id]);
        assert_eq!(transport.closed(), &[id]);
        assert_eq!(
            transport.poll(),
            vec![
                (id, ChannelEvent::Opened),
                (id, ChannelEvent::Message("hello".to_string())),
            ]
        );
        assert!(transport.poll().is_empty());
    }

    #[test]
    fn fake_transport_autostart_failure() {
        let mut transport = FakeTransport::new();
        assert!(transport.autostart().is_err());
        let mut transport = FakeTransport::new().with_autostart(Some(true));
        assert!(transport.autostart().unwrap());
    }
}
