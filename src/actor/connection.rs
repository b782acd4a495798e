//! Connection Actor: dedicated thread owning the log-source socket.
//!
//! The actor performs the handshake, forwards every inbound line to the
//! main loop as a [`ConnectionEvent`], and writes outbound tokens queued
//! by the main loop. Nothing here touches application state; the main
//! loop applies events on its own thread.

use super::messages::{CloseReason, ConnectionEvent, Outbound};
use crate::error::Error;
use crate::stream::{Connector, Inbound, Transport};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace};

/// Handle to the connection thread.
pub struct ConnectionActor {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    outbound: Sender<Outbound>,
    events: Receiver<ConnectionEvent>,
}

impl ConnectionActor {
    /// Spawn the connection thread and start dialing `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn the thread.
    pub fn spawn<C: Connector>(connector: C, url: String) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        // Unbounded both ways: inbound lines are never dropped and
        // outbound sends never block the event loop.
        let (events_tx, events_rx) = unbounded();
        let (outbound_tx, outbound_rx) = unbounded();

        let handle = thread::Builder::new()
            .name("logview-connection".to_string())
            .spawn(move || {
                Self::run_loop(&connector, &url, &events_tx, &outbound_rx, &shutdown_clone);
            })?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
            outbound: outbound_tx,
            events: events_rx,
        })
    }

    /// Queue a text token for sending. Never blocks.
    ///
    /// Returns `false` if the thread has already exited.
    pub fn send_text(&self, text: &str) -> bool {
        self.outbound.try_send(Outbound::Text(text.to_owned())).is_ok()
    }

    /// Receiver of events produced by the thread.
    pub const fn events(&self) -> &Receiver<ConnectionEvent> {
        &self.events
    }

    /// Ask the thread to close the session and exit.
    pub fn shutdown(&self) {
        let _ = self.outbound.try_send(Outbound::Close);
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Shut down and wait for the thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Shut down without waiting.
    ///
    /// Used while a handshake may still be in progress: the thread
    /// notices the flag as soon as the handshake returns and closes the
    /// socket itself.
    pub fn detach(mut self) {
        self.shutdown();
        self.handle.take();
    }

    fn run_loop<C: Connector>(
        connector: &C,
        url: &str,
        events: &Sender<ConnectionEvent>,
        outbound: &Receiver<Outbound>,
        shutdown: &AtomicBool,
    ) {
        let mut transport = match connector.connect(url) {
            Ok(transport) => transport,
            Err(source) => {
                let error = Error::ConnectionFailure {
                    url: url.to_owned(),
                    source,
                };
                let _ = events.send(ConnectionEvent::Closed(error.into()));
                return;
            }
        };

        if shutdown.load(Ordering::Relaxed) || events.send(ConnectionEvent::Opened).is_err() {
            transport.close();
            return;
        }

        let reason = loop {
            if shutdown.load(Ordering::Relaxed) {
                transport.close();
                break CloseReason::Requested;
            }

            if let Some(reason) = Self::flush_outbound(&mut transport, outbound) {
                break reason;
            }

            match transport.poll_message() {
                Ok(Some(Inbound::Line(line))) => {
                    trace!(bytes = line.len(), "line received");
                    if events.send(ConnectionEvent::Message(line)).is_err() {
                        // Main loop is gone.
                        transport.close();
                        return;
                    }
                }
                Ok(Some(Inbound::Closed)) => {
                    // Answer the peer's close frame before the socket drops.
                    transport.close();
                    break Error::UnexpectedClose("closed by peer".to_string()).into();
                }
                Ok(None) => {}
                Err(e) => {
                    transport.close();
                    break Error::UnexpectedClose(e.to_string()).into();
                }
            }
        };

        debug!(?reason, "connection thread exiting");
        let _ = events.send(ConnectionEvent::Closed(reason));
    }

    /// Write every queued outbound command. Returns a reason when the
    /// session has to end.
    fn flush_outbound<T: Transport>(transport: &mut T, outbound: &Receiver<Outbound>) -> Option<CloseReason> {
        loop {
            match outbound.try_recv() {
                Ok(Outbound::Text(text)) => {
                    if let Err(e) = transport.send_text(&text) {
                        transport.close();
                        return Some(Error::UnexpectedClose(e.to_string()).into());
                    }
                    trace!(token = %text, "token sent");
                }
                Ok(Outbound::Close) | Err(TryRecvError::Disconnected) => {
                    transport.close();
                    return Some(CloseReason::Requested);
                }
                Err(TryRecvError::Empty) => return None,
            }
        }
    }
}

impl Drop for ConnectionActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::testing::ChannelConnector;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(2);

    #[test]
    fn test_forwards_lines_and_tokens() {
        let (connector, remote) = ChannelConnector::new();
        let actor = ConnectionActor::spawn(connector, "ws://test".into()).unwrap();

        assert_eq!(actor.events().recv_timeout(WAIT), Ok(ConnectionEvent::Opened));

        assert!(actor.send_text("next"));
        assert_eq!(remote.outbound.recv_timeout(WAIT).unwrap(), "next");

        remote.inbound.send(Some("line".into())).unwrap();
        assert_eq!(
            actor.events().recv_timeout(WAIT),
            Ok(ConnectionEvent::Message("line".into()))
        );

        actor.join();
        assert_eq!(*remote.closes.lock().unwrap(), 1);
    }

    #[test]
    fn test_refused_handshake_reports_failure() {
        let actor = ConnectionActor::spawn(ChannelConnector::refusing(), "ws://test".into()).unwrap();
        match actor.events().recv_timeout(WAIT) {
            Ok(ConnectionEvent::Closed(CloseReason::ConnectionFailure(msg))) => {
                assert!(msg.contains("refused"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        actor.join();
    }

    #[test]
    fn test_peer_close_is_unexpected() {
        let (connector, remote) = ChannelConnector::new();
        let actor = ConnectionActor::spawn(connector, "ws://test".into()).unwrap();
        assert_eq!(actor.events().recv_timeout(WAIT), Ok(ConnectionEvent::Opened));

        remote.inbound.send(None).unwrap();
        assert!(matches!(
            actor.events().recv_timeout(WAIT),
            Ok(ConnectionEvent::Closed(CloseReason::UnexpectedClose(_)))
        ));
        assert_eq!(*remote.closes.lock().unwrap(), 1);
        actor.join();
        assert_eq!(*remote.closes.lock().unwrap(), 1);
    }

    #[test]
    fn test_lost_peer_is_closed() {
        let (connector, remote) = ChannelConnector::new();
        let actor = ConnectionActor::spawn(connector, "ws://test".into()).unwrap();
        assert_eq!(actor.events().recv_timeout(WAIT), Ok(ConnectionEvent::Opened));

        let closes = remote.closes.clone();
        drop(remote.inbound);
        assert!(matches!(
            actor.events().recv_timeout(WAIT),
            Ok(ConnectionEvent::Closed(CloseReason::UnexpectedClose(_)))
        ));
        assert_eq!(*closes.lock().unwrap(), 1);
        actor.join();
    }
}
