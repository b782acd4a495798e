//! The log stream: connection, buffer and controller.

mod controller;
mod log_buffer;
mod transport;

pub use controller::{BufferChanged, ConnectionState, LoadMore, MoreRows, StreamConfig, StreamController};
pub use log_buffer::{progress_percent, ByteCounter, LogBuffer};
pub use transport::{Connector, Inbound, Transport, WsConnector, WsTransport};

#[cfg(test)]
pub(crate) use transport::testing;
