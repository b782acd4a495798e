//! Actor Model: Message-passing concurrency for the viewer.
//!
//! Each external resource is owned by one thread that talks to the main
//! loop over crossbeam channels:
//! - **Input Actor**: Polls terminal events, forwards to main loop
//! - **Render Actor**: Receives frames, diffs and flushes
//! - **Connection Actor**: Owns the log-source socket
//! - **Main Loop**: Owns all application state and applies events
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     InputEvent      ┌──────────────┐
//! │ Input Thread │ ─────────────────▶  │              │
//! └──────────────┘                     │  Main Loop   │
//!                                      │              │
//! ┌──────────────┐    RenderCommand    │              │
//! │Render Thread │ ◀───────────────── │              │
//! └──────────────┘                     └──────────────┘
//!                                         ▲      │
//!                         ConnectionEvent │      │ Outbound
//!                                         │      ▼
//!                                      ┌──────────────┐
//!                                      │  Connection  │
//!                                      └──────────────┘
//! ```

mod connection;
mod engine;
mod input;
mod messages;
mod renderer;

pub use connection::ConnectionActor;
pub use engine::{Engine, EngineConfig};
pub use input::InputActor;
pub use messages::{CloseReason, ConnectionEvent, InputEvent, KeyCode, KeyModifiers, Outbound, RenderCommand};
pub use renderer::{RenderStats, RendererActor};
