//! # logview
//!
//! A terminal viewer for a log streamed over WebSocket.
//!
//! The viewer connects to a log source, appends every received line to
//! an ordered buffer, and shows the buffer as a virtualized list of
//! wrapped, variable-height rows that can follow the newest line.
//!
//! ## Core Concepts
//!
//! - **Stream controller**: owns the connection and the append-only log
//!   buffer, counts received bytes, and sends "load more" requests
//! - **Log view**: measures rows lazily, renders only what is visible,
//!   asks for more rows near the end, and keeps auto-scroll
//! - **Actor model**: isolated threads for input, rendering and the
//!   socket; all state lives on the main loop thread
//! - **Double-buffered rendering**: frames are diffed and flushed in a
//!   single write
//!
//! ## Example
//!
//! ```rust,ignore
//! use logview::{Config, StreamController, WsConnector};
//!
//! let config = Config::default();
//! let mut stream = StreamController::new(config.stream());
//! stream.connect(WsConnector::new(config.poll_interval()));
//! stream.pump(std::time::Duration::from_secs(1));
//! println!("{} lines", stream.log().len());
//! ```

pub mod actor;
pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod screen;
pub mod stream;
pub mod widget;

// Re-exports for convenience
pub use actor::{ConnectionEvent, Engine, EngineConfig, InputEvent, KeyCode, KeyModifiers};
pub use app::App;
pub use config::Config;
pub use error::{Error, Result, TransportError};
pub use screen::{Cell, Frame, Modifiers, Rect, Rgb};
pub use stream::{
    progress_percent, BufferChanged, ConnectionState, LoadMore, LogBuffer, MoreRows, StreamConfig, StreamController,
    WsConnector,
};
pub use widget::{LogView, LogViewConfig, RowHeightCache};
