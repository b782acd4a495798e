//! Error types.

use std::io;
use thiserror::Error;

/// Errors surfaced by the viewer's setup paths.
///
/// Connection problems never reach the UI; they end the session and are
/// logged. They are still represented here so the connection actor and
/// the binary can report them uniformly.
#[derive(Debug, Error)]
pub enum Error {
    /// The handshake with the log source failed.
    #[error("connection to {url} failed: {source}")]
    ConnectionFailure {
        /// Endpoint that was dialed.
        url: String,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },

    /// The log source went away without a close request from us.
    #[error("connection closed unexpectedly: {0}")]
    UnexpectedClose(String),

    /// Configuration was unreadable or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Terminal or file I/O failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failures of a single transport operation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Socket-level I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// The peer violated the WebSocket protocol, or the handshake was
    /// rejected.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The connection is already closed.
    #[error("connection closed")]
    Closed,
}

/// Result alias for viewer operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
