//! Transport: the line-oriented connection to the log source.
//!
//! The connection actor drives a [`Transport`] from its own thread. The
//! production transport is a blocking WebSocket whose socket has a read
//! timeout, so a single thread can interleave reads with outbound sends
//! and shutdown checks.

use crate::error::TransportError;
use std::io::ErrorKind;
use std::net::TcpStream;
use std::time::Duration;
use tracing::debug;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

/// What a poll of the transport produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// One log line.
    Line(String),
    /// The peer closed the connection.
    Closed,
}

/// A connected, bidirectional text channel.
pub trait Transport: Send {
    /// Send one text token.
    fn send_text(&mut self, text: &str) -> Result<(), TransportError>;

    /// Wait up to the transport's poll interval for the next inbound
    /// message. `Ok(None)` means nothing arrived in time.
    fn poll_message(&mut self) -> Result<Option<Inbound>, TransportError>;

    /// Close the connection. Errors are ignored; the transport is
    /// unusable afterwards either way.
    fn close(&mut self);
}

/// Something that can open a [`Transport`] to a URL.
pub trait Connector: Send + 'static {
    /// Transport produced on success.
    type Transport: Transport + 'static;

    /// Perform the handshake.
    fn connect(&self, url: &str) -> Result<Self::Transport, TransportError>;
}

/// Connector for `ws://` and `wss://` endpoints.
#[derive(Debug, Clone)]
pub struct WsConnector {
    poll_interval: Duration,
}

impl WsConnector {
    /// Create a connector whose transports wait at most `poll_interval`
    /// per read.
    pub const fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }
}

impl Connector for WsConnector {
    type Transport = WsTransport;

    fn connect(&self, url: &str) -> Result<WsTransport, TransportError> {
        // Another component may already have installed a provider.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let (socket, response) = tungstenite::connect(url).map_err(TransportError::from)?;
        debug!(status = %response.status(), "websocket handshake complete");

        let timeout = Some(self.poll_interval.max(Duration::from_millis(1)));
        match socket.get_ref() {
            MaybeTlsStream::Plain(stream) => stream.set_read_timeout(timeout)?,
            MaybeTlsStream::Rustls(stream) => stream.get_ref().set_read_timeout(timeout)?,
            _ => {}
        }

        Ok(WsTransport { socket })
    }
}

/// Blocking WebSocket transport.
pub struct WsTransport {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
}

impl Transport for WsTransport {
    fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        self.socket
            .send(Message::Text(text.to_owned()))
            .map_err(TransportError::from)
    }

    fn poll_message(&mut self) -> Result<Option<Inbound>, TransportError> {
        match self.socket.read() {
            Ok(Message::Text(text)) => Ok(Some(Inbound::Line(text))),
            Ok(Message::Binary(data)) => Ok(Some(Inbound::Line(String::from_utf8_lossy(&data).into_owned()))),
            Ok(Message::Close(frame)) => {
                debug!(?frame, "close frame received");
                Ok(Some(Inbound::Closed))
            }
            // Ping/pong are answered by the protocol layer.
            Ok(_) => Ok(None),
            Err(tungstenite::Error::Io(e)) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(None),
            Err(tungstenite::Error::ConnectionClosed) => Ok(Some(Inbound::Closed)),
            Err(e) => Err(e.into()),
        }
    }

    fn close(&mut self) {
        let _ = self.socket.close(None);
        let _ = self.socket.flush();
    }
}

impl From<tungstenite::Error> for TransportError {
    fn from(e: tungstenite::Error) -> Self {
        match e {
            tungstenite::Error::Io(io) => Self::Io(io),
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => Self::Closed,
            other => Self::Protocol(other.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory transport driven by channels.

    use super::{Connector, Inbound, Transport};
    use crate::error::TransportError;
    use crossbeam_channel::{unbounded, Receiver, Sender};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Test-side handles for a [`ChannelConnector`].
    pub struct Remote {
        /// Push inbound traffic (`None` closes from the peer side).
        pub inbound: Sender<Option<String>>,
        /// Tokens the client sent.
        pub outbound: Receiver<String>,
        /// Number of times `close` was called on the transport.
        pub closes: Arc<Mutex<usize>>,
    }

    /// Connector that hands out one channel-backed transport.
    pub struct ChannelConnector {
        transport: Mutex<Option<ChannelTransport>>,
        refuse: bool,
    }

    impl ChannelConnector {
        pub fn new() -> (Self, Remote) {
            let (inbound_tx, inbound_rx) = unbounded();
            let (outbound_tx, outbound_rx) = unbounded();
            let closes = Arc::new(Mutex::new(0));
            let transport = ChannelTransport {
                inbound: inbound_rx,
                outbound: outbound_tx,
                closes: closes.clone(),
            };
            let connector = Self {
                transport: Mutex::new(Some(transport)),
                refuse: false,
            };
            (
                connector,
                Remote {
                    inbound: inbound_tx,
                    outbound: outbound_rx,
                    closes,
                },
            )
        }

        pub fn refusing() -> Self {
            Self {
                transport: Mutex::new(None),
                refuse: true,
            }
        }
    }

    impl Connector for ChannelConnector {
        type Transport = ChannelTransport;

        fn connect(&self, _url: &str) -> Result<ChannelTransport, TransportError> {
            if self.refuse {
                return Err(TransportError::Protocol("connection refused".into()));
            }
            self.transport
                .lock()
                .unwrap()
                .take()
                .ok_or(TransportError::Closed)
        }
    }

    pub struct ChannelTransport {
        inbound: Receiver<Option<String>>,
        outbound: Sender<String>,
        closes: Arc<Mutex<usize>>,
    }

    impl Transport for ChannelTransport {
        fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
            self.outbound
                .send(text.to_owned())
                .map_err(|_| TransportError::Closed)
        }

        fn poll_message(&mut self) -> Result<Option<Inbound>, TransportError> {
            match self.inbound.recv_timeout(Duration::from_millis(5)) {
                Ok(Some(line)) => Ok(Some(Inbound::Line(line))),
                Ok(None) => Ok(Some(Inbound::Closed)),
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => Ok(None),
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => Err(TransportError::Closed),
            }
        }

        fn close(&mut self) {
            *self.closes.lock().unwrap() += 1;
        }
    }
}
