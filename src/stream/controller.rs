//! Stream Controller: owns the log-source connection and the log buffer.
//!
//! The controller lives on the main loop thread. The connection itself
//! runs in a [`ConnectionActor`]; its events are applied here with
//! [`StreamController::handle_event`], so the buffer is only ever
//! mutated from one thread.

use super::log_buffer::{progress_percent, ByteCounter, LogBuffer};
use super::transport::Connector;
use crate::actor::{CloseReason, ConnectionActor, ConnectionEvent};
use crossbeam_channel::{never, unbounded, Receiver, Sender};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle of the single connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// `connect` has not been called.
    #[default]
    Idle,
    /// Handshake in progress.
    Connecting,
    /// Session established.
    Open,
    /// Session over; nothing more will be appended.
    Closed,
}

impl ConnectionState {
    /// Short label for status displays.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// Outcome of [`StreamController::load_more`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    /// A request token was queued.
    Requested,
    /// The connection is not open; nothing was sent.
    Skipped,
}

/// Notification sent to subscribers after every append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferChanged {
    /// Buffer length after the append.
    pub len: usize,
    /// Cumulative bytes received after the append.
    pub bytes_received: u64,
}

/// Source of additional rows for the log view.
pub trait MoreRows {
    /// Ask for more rows without waiting for them.
    fn load_more(&mut self) -> LoadMore;
}

/// Settings for the stream controller.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Endpoint of the log source.
    pub url: String,
    /// Token sent once the session opens.
    pub greeting: String,
    /// Token sent to request more lines.
    pub request_token: String,
    /// Expected total size of the log, for the progress estimate.
    pub expected_total_bytes: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: crate::config::DEFAULT_URL.to_string(),
            greeting: "Hello Server!".to_string(),
            request_token: "next".to_string(),
            expected_total_bytes: crate::config::DEFAULT_EXPECTED_TOTAL_BYTES,
        }
    }
}

/// Owns the connection, the log buffer and the byte counter.
pub struct StreamController {
    config: StreamConfig,
    log: LogBuffer,
    bytes: ByteCounter,
    state: ConnectionState,
    connection: Option<ConnectionActor>,
    subscribers: Vec<Sender<BufferChanged>>,
}

impl StreamController {
    /// Create a controller that is not yet connected.
    pub fn new(config: StreamConfig) -> Self {
        Self {
            config,
            log: LogBuffer::new(),
            bytes: ByteCounter::default(),
            state: ConnectionState::Idle,
            connection: None,
            subscribers: Vec::new(),
        }
    }

    /// The lines received so far.
    pub const fn log(&self) -> &LogBuffer {
        &self.log
    }

    /// Current connection state.
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Total UTF-8 bytes received.
    pub const fn bytes_received(&self) -> u64 {
        self.bytes.total()
    }

    /// Received bytes as a percentage of the expected total, rounded to
    /// two decimals.
    pub fn progress_percent(&self) -> f64 {
        progress_percent(self.bytes.total(), self.config.expected_total_bytes)
    }

    /// The configured endpoint.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Register for [`BufferChanged`] notifications.
    pub fn subscribe(&mut self) -> Receiver<BufferChanged> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Open the connection through `connector`.
    ///
    /// There is exactly one connection attempt per controller: calling
    /// this again, or after the session closed, only logs.
    pub fn connect<C: Connector>(&mut self, connector: C) {
        if self.state != ConnectionState::Idle {
            warn!(state = ?self.state, "connect ignored; controller already used");
            return;
        }

        info!(url = %self.config.url, "connecting");
        match ConnectionActor::spawn(connector, self.config.url.clone()) {
            Ok(actor) => {
                self.connection = Some(actor);
                self.state = ConnectionState::Connecting;
            }
            Err(e) => {
                warn!(error = %e, "could not start connection thread");
                self.state = ConnectionState::Closed;
            }
        }
    }

    /// Receiver for pending connection events, for use in `select!`.
    ///
    /// Once the session is closed this is a receiver that never fires.
    pub fn events(&self) -> Receiver<ConnectionEvent> {
        match (&self.connection, self.state) {
            (Some(actor), ConnectionState::Connecting | ConnectionState::Open) => actor.events().clone(),
            _ => never(),
        }
    }

    /// Wait up to `timeout` for one connection event, then apply it and
    /// everything else already queued. Returns how many were applied.
    pub fn pump(&mut self, timeout: Duration) -> usize {
        let events = self.events();
        let Ok(first) = events.recv_timeout(timeout) else {
            return 0;
        };
        self.handle_event(first);
        let mut applied = 1;
        while let Ok(event) = events.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    /// Apply one event from the connection thread.
    pub fn handle_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Opened => self.on_open(),
            ConnectionEvent::Message(line) => self.on_message(line),
            ConnectionEvent::Closed(reason) => self.on_close(&reason),
        }
    }

    fn on_open(&mut self) {
        if self.state != ConnectionState::Connecting {
            return;
        }
        self.state = ConnectionState::Open;
        info!(url = %self.config.url, "connection established");
        self.send(&self.config.greeting);
    }

    /// Append one line and notify subscribers.
    ///
    /// The payload is not validated; empty lines are appended too.
    pub fn on_message(&mut self, line: String) {
        self.bytes.record(&line);
        let len = self.log.push(line) + 1;

        let change = BufferChanged {
            len,
            bytes_received: self.bytes.total(),
        };
        self.subscribers.retain(|tx| tx.send(change).is_ok());
    }

    fn on_close(&mut self, reason: &CloseReason) {
        match reason {
            CloseReason::Requested => info!("connection closed"),
            CloseReason::ConnectionFailure(e) | CloseReason::UnexpectedClose(e) => {
                warn!(lines = self.log.len(), "{e}");
            }
        }
        self.state = ConnectionState::Closed;
    }

    /// Request more lines from the log source.
    ///
    /// Fire-and-forget: the token is queued and the call returns at once.
    /// Responses arrive later through [`Self::handle_event`] and are not
    /// correlated with individual requests.
    pub fn load_more(&mut self) -> LoadMore {
        if self.state != ConnectionState::Open {
            return LoadMore::Skipped;
        }
        if self.send(&self.config.request_token) {
            LoadMore::Requested
        } else {
            LoadMore::Skipped
        }
    }

    fn send(&self, token: &str) -> bool {
        let sent = self
            .connection
            .as_ref()
            .is_some_and(|actor| actor.send_text(token));
        if !sent {
            debug!(token, "token dropped; connection thread gone");
        }
        sent
    }

    /// Close the connection and drop all subscriptions.
    ///
    /// Idempotent. Returns `true` only for the call that performed the
    /// teardown.
    pub fn disconnect(&mut self) -> bool {
        let Some(actor) = self.connection.take() else {
            return false;
        };

        if self.state == ConnectionState::Connecting {
            // The handshake cannot be interrupted; let the thread finish
            // it and close on its own.
            actor.detach();
        } else {
            actor.join();
        }

        self.subscribers.clear();
        self.state = ConnectionState::Closed;
        info!(lines = self.log.len(), bytes = self.bytes.total(), "disconnected");
        true
    }
}

impl MoreRows for StreamController {
    fn load_more(&mut self) -> LoadMore {
        Self::load_more(self)
    }
}

impl Drop for StreamController {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::testing::ChannelConnector;

    const WAIT: Duration = Duration::from_secs(2);

    fn controller() -> StreamController {
        StreamController::new(StreamConfig {
            url: "ws://test".into(),
            expected_total_bytes: 100,
            ..StreamConfig::default()
        })
    }

    fn pump_until(controller: &mut StreamController, done: impl Fn(&StreamController) -> bool) {
        let deadline = std::time::Instant::now() + WAIT;
        while !done(controller) {
            assert!(std::time::Instant::now() < deadline, "timed out");
            controller.pump(Duration::from_millis(20));
        }
    }

    #[test]
    fn test_messages_append_in_arrival_order() {
        let mut c = controller();
        for line in ["a", "b", "c"] {
            c.on_message(line.to_string());
        }
        assert_eq!(c.log().iter().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(c.bytes_received(), 3);
    }

    #[test]
    fn test_subscribers_are_notified() {
        let mut c = controller();
        let rx = c.subscribe();
        c.on_message("héllo".to_string());
        assert_eq!(
            rx.try_recv(),
            Ok(BufferChanged {
                len: 1,
                bytes_received: 6
            })
        );
    }

    #[test]
    fn test_load_more_skipped_unless_open() {
        let mut c = controller();
        assert_eq!(c.load_more(), LoadMore::Skipped);
        c.handle_event(ConnectionEvent::Closed(CloseReason::Requested));
        assert_eq!(c.load_more(), LoadMore::Skipped);
    }

    #[test]
    fn test_progress_percent() {
        let mut c = controller();
        assert!(c.progress_percent().abs() < f64::EPSILON);
        c.on_message("x".repeat(100));
        assert!((c.progress_percent() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_session_greets_and_requests() {
        let (connector, remote) = ChannelConnector::new();
        let mut c = controller();
        c.connect(connector);
        assert_eq!(c.state(), ConnectionState::Connecting);

        pump_until(&mut c, |c| c.state() == ConnectionState::Open);
        assert_eq!(remote.outbound.recv_timeout(WAIT).unwrap(), "Hello Server!");

        assert_eq!(c.load_more(), LoadMore::Requested);
        assert_eq!(c.load_more(), LoadMore::Requested);
        assert_eq!(remote.outbound.recv_timeout(WAIT).unwrap(), "next");
        assert_eq!(remote.outbound.recv_timeout(WAIT).unwrap(), "next");

        for line in ["a", "b", "c"] {
            remote.inbound.send(Some(line.into())).unwrap();
        }
        pump_until(&mut c, |c| c.log().len() == 3);
        assert_eq!(c.log().iter().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn test_failed_connect_closes_without_lines() {
        let mut c = controller();
        c.connect(ChannelConnector::refusing());
        pump_until(&mut c, |c| c.state() == ConnectionState::Closed);
        assert!(c.log().is_empty());
        assert_eq!(c.load_more(), LoadMore::Skipped);
    }

    #[test]
    fn test_peer_close_stops_appending() {
        let (connector, remote) = ChannelConnector::new();
        let mut c = controller();
        c.connect(connector);
        pump_until(&mut c, |c| c.state() == ConnectionState::Open);

        remote.inbound.send(Some("last".into())).unwrap();
        remote.inbound.send(None).unwrap();
        pump_until(&mut c, |c| c.state() == ConnectionState::Closed);

        assert_eq!(c.log().len(), 1);
        assert_eq!(c.pump(Duration::from_millis(10)), 0);
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let (connector, remote) = ChannelConnector::new();
        let mut c = controller();
        let _rx = c.subscribe();
        c.connect(connector);
        pump_until(&mut c, |c| c.state() == ConnectionState::Open);

        assert!(c.disconnect());
        assert!(!c.disconnect());
        assert_eq!(c.state(), ConnectionState::Closed);
        assert_eq!(c.subscriber_count(), 0);
        assert_eq!(*remote.closes.lock().unwrap(), 1);

        drop(c);
        assert_eq!(*remote.closes.lock().unwrap(), 1);
    }

    #[test]
    fn test_connect_only_once() {
        let (connector, _remote) = ChannelConnector::new();
        let mut c = controller();
        c.connect(connector);
        c.connect(ChannelConnector::refusing());
        pump_until(&mut c, |c| c.state() == ConnectionState::Open);
    }
}
