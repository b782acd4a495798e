//! Screen: the double-buffered drawing surface.
//!
//! - [`Cell`]: one terminal column with grapheme and style
//! - [`Frame`]: a full screen of cells
//! - [`diff`]: minimal ANSI output between two frames
//! - [`Rect`]: widget placement

mod cell;
mod frame;
mod rect;
pub mod diff;

pub use cell::{Cell, Modifiers, Rgb};
pub use frame::Frame;
pub use rect::Rect;
