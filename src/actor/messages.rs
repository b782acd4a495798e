//! Message types for actor communication.
//!
//! These enums define the protocol between the actor threads and the
//! main loop.

use crate::error::Error;
use crate::screen::Frame;

/// Key codes the viewer reacts to.
///
/// A subset of crossterm's `KeyCode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page Up.
    PageUp,
    /// Page Down.
    PageDown,
    /// Escape key.
    Esc,
}

/// Key modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyModifiers {
    /// Shift key held.
    pub shift: bool,
    /// Control key held.
    pub control: bool,
    /// Alt/Option key held.
    pub alt: bool,
}

impl KeyModifiers {
    /// No modifiers.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
    };
}

/// Events from the input thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A key was pressed.
    Key {
        /// The key code.
        code: KeyCode,
        /// Modifiers held during keypress.
        modifiers: KeyModifiers,
    },

    /// Mouse wheel.
    MouseScroll {
        /// Column of the pointer.
        x: u16,
        /// Row of the pointer.
        y: u16,
        /// Scroll delta (positive = up, negative = down).
        delta: i16,
    },

    /// Terminal was resized.
    Resize {
        /// New width in columns.
        width: u16,
        /// New height in rows.
        height: u16,
    },

    /// Input thread encountered an error.
    Error(String),

    /// Input thread is shutting down.
    Shutdown,
}

impl InputEvent {
    /// Shorthand for an unmodified key press.
    pub const fn key(code: KeyCode) -> Self {
        Self::Key {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }
}

/// Commands sent to the render thread.
#[derive(Debug)]
pub enum RenderCommand {
    /// Redraw everything from this frame.
    FullRedraw(Box<Frame>),

    /// Diff this frame against what is on screen.
    Update(Box<Frame>),

    /// Set the terminal window title.
    SetTitle(String),

    /// Shutdown the render thread.
    Shutdown,
}

/// Why a connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// We asked for it (disconnect or shutdown).
    Requested,
    /// The handshake never completed.
    ConnectionFailure(String),
    /// The peer or the network ended an open session.
    UnexpectedClose(String),
}

impl From<Error> for CloseReason {
    fn from(e: Error) -> Self {
        match e {
            Error::ConnectionFailure { .. } => Self::ConnectionFailure(e.to_string()),
            other => Self::UnexpectedClose(other.to_string()),
        }
    }
}

/// Events from the connection thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Handshake complete; the session is open.
    Opened,
    /// One inbound log line.
    Message(String),
    /// The session is over. Always the last event.
    Closed(CloseReason),
}

/// Commands sent to the connection thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Send a text token.
    Text(String),
    /// Close the session.
    Close,
}
