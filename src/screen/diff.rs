//! Diffing: turn the difference between two frames into ANSI output.
//!
//! Only changed cells are emitted. Cursor moves are skipped for cells
//! adjacent to the last write, and SGR sequences are only emitted when
//! the style actually changes. Everything is accumulated into one
//! `Vec<u8>` so the renderer can flush a frame with a single write.

use super::cell::{Cell, Modifiers, Rgb};
use super::frame::Frame;
use std::io::Write;

/// Terminal state as last written by the diff engine.
#[derive(Debug, Clone)]
pub struct DiffState {
    cursor_x: u16,
    cursor_y: u16,
    fg: Option<Rgb>,
    bg: Option<Rgb>,
    modifiers: Option<Modifiers>,
}

impl Default for DiffState {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffState {
    /// Create a state with an unknown cursor position and style.
    pub const fn new() -> Self {
        Self {
            cursor_x: u16::MAX,
            cursor_y: u16::MAX,
            fg: None,
            bg: None,
            modifiers: None,
        }
    }

    /// Forget everything (after a full redraw or an external write).
    pub const fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Counters describing one diff pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    /// Number of cells that were written.
    pub cells_changed: usize,
    /// Number of cursor move sequences emitted.
    pub cursor_moves: usize,
    /// Number of SGR sequences emitted.
    pub style_changes: usize,
}

/// Emit the cells of `next` that differ from `current`.
///
/// Both frames must have the same dimensions.
pub fn render_diff(current: &Frame, next: &Frame, output: &mut Vec<u8>, state: &mut DiffState) -> DiffStats {
    debug_assert_eq!(current.width(), next.width());
    debug_assert_eq!(current.height(), next.height());

    let mut stats = DiffStats::default();
    let width = usize::from(next.width());

    for (idx, (old, new)) in current.cells().iter().zip(next.cells()).enumerate() {
        if old == new || new.is_continuation() {
            continue;
        }
        #[allow(clippy::cast_possible_truncation)]
        let (x, y) = ((idx % width) as u16, (idx / width) as u16);

        if state.cursor_x != x || state.cursor_y != y {
            emit_cursor_move(output, x, y);
            stats.cursor_moves += 1;
        }
        stats.style_changes += emit_style(output, new, state);
        output.extend_from_slice(new.symbol().as_bytes());

        stats.cells_changed += 1;
        state.cursor_x = x + u16::from(new.width().max(1));
        state.cursor_y = y;
    }

    stats
}

/// Emit a complete redraw of `frame`, ignoring any previous content.
pub fn render_full(frame: &Frame, output: &mut Vec<u8>, state: &mut DiffState) {
    state.reset();
    output.extend_from_slice(b"\x1b[0m\x1b[H");

    for y in 0..frame.height() {
        emit_cursor_move(output, 0, y);
        for x in 0..frame.width() {
            let Some(cell) = frame.get(x, y) else { continue };
            if cell.is_continuation() {
                continue;
            }
            emit_style(output, cell, state);
            output.extend_from_slice(cell.symbol().as_bytes());
        }
    }

    state.cursor_x = u16::MAX;
    state.cursor_y = u16::MAX;
}

/// Cursor move using the shortest CSI form (1-indexed).
fn emit_cursor_move(output: &mut Vec<u8>, x: u16, y: u16) {
    let (row, col) = (u32::from(y) + 1, u32::from(x) + 1);
    if row == 1 && col == 1 {
        output.extend_from_slice(b"\x1b[H");
    } else if col == 1 {
        let _ = write!(output, "\x1b[{row}H");
    } else {
        let _ = write!(output, "\x1b[{row};{col}H");
    }
}

/// Bring the terminal style in line with `cell`, returning how many
/// SGR sequences were written.
fn emit_style(output: &mut Vec<u8>, cell: &Cell, state: &mut DiffState) -> usize {
    let mut emitted = 0;
    let mods = cell.modifiers();

    // Removing an attribute needs a full reset, which also drops colors.
    let current = state.modifiers.unwrap_or_else(Modifiers::empty);
    if state.modifiers.is_none() || !current.difference(mods).is_empty() {
        output.extend_from_slice(b"\x1b[0m");
        state.fg = None;
        state.bg = None;
        emit_modifier_set(output, mods);
        state.modifiers = Some(mods);
        emitted += 1;
    } else if current != mods {
        emit_modifier_set(output, mods.difference(current));
        state.modifiers = Some(mods);
        emitted += 1;
    }

    if state.fg != Some(cell.fg()) {
        let c = cell.fg();
        let _ = write!(output, "\x1b[38;2;{};{};{}m", c.r, c.g, c.b);
        state.fg = Some(c);
        emitted += 1;
    }
    if state.bg != Some(cell.bg()) {
        let c = cell.bg();
        let _ = write!(output, "\x1b[48;2;{};{};{}m", c.r, c.g, c.b);
        state.bg = Some(c);
        emitted += 1;
    }
    emitted
}

fn emit_modifier_set(output: &mut Vec<u8>, modifiers: Modifiers) {
    const CODES: [(Modifiers, &[u8]); 2] = [(Modifiers::BOLD, b"\x1b[1m"), (Modifiers::DIM, b"\x1b[2m")];
    for (flag, code) in CODES {
        if modifiers.contains(flag) {
            output.extend_from_slice(code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_frames_emit_nothing() {
        let a = Frame::new(10, 5);
        let b = Frame::new(10, 5);
        let mut output = Vec::new();
        let stats = render_diff(&a, &b, &mut output, &mut DiffState::new());
        assert_eq!(stats.cells_changed, 0);
        assert!(output.is_empty());
    }

    #[test]
    fn test_single_change() {
        let a = Frame::new(10, 5);
        let mut b = Frame::new(10, 5);
        b.set(5, 2, Cell::new('X'));

        let mut output = Vec::new();
        let stats = render_diff(&a, &b, &mut output, &mut DiffState::new());

        assert_eq!(stats.cells_changed, 1);
        assert_eq!(stats.cursor_moves, 1);
        let text = String::from_utf8_lossy(&output);
        assert!(text.starts_with("\x1b[3;6H"));
        assert!(text.ends_with('X'));
    }

    #[test]
    fn test_adjacent_cells_share_one_move() {
        let a = Frame::new(10, 5);
        let mut b = Frame::new(10, 5);
        b.draw_text(2, 1, 10, "abc", Rgb::WHITE, Rgb::BLACK);

        let mut output = Vec::new();
        let mut state = DiffState::new();
        let stats = render_diff(&a, &b, &mut output, &mut state);

        assert_eq!(stats.cells_changed, 3);
        assert_eq!(stats.cursor_moves, 1);
        // reset + fg + bg once, then nothing for the same style
        assert_eq!(stats.style_changes, 3);
    }

    #[test]
    fn test_dropping_a_modifier_resets_style() {
        let a = Frame::new(4, 1);
        let mut b = Frame::new(4, 1);
        b.draw_styled_text(0, 0, 4, "a", Rgb::WHITE, Rgb::BLACK, Modifiers::BOLD);
        b.draw_text(1, 0, 4, "b", Rgb::WHITE, Rgb::BLACK);

        let mut output = Vec::new();
        render_diff(&a, &b, &mut output, &mut DiffState::new());
        let text = String::from_utf8_lossy(&output);
        let (bold, plain) = text.split_once('a').unwrap();
        assert!(bold.contains("\x1b[0m\x1b[1m"));
        assert!(plain.starts_with("\x1b[0m"));
        assert!(!plain.contains("\x1b[1m"));
    }

    #[test]
    fn test_cursor_move_forms() {
        let mut output = Vec::new();
        emit_cursor_move(&mut output, 0, 0);
        assert_eq!(&output, b"\x1b[H");
        output.clear();
        emit_cursor_move(&mut output, 0, 5);
        assert_eq!(&output, b"\x1b[6H");
        output.clear();
        emit_cursor_move(&mut output, 10, 5);
        assert_eq!(&output, b"\x1b[6;11H");
    }

    #[test]
    fn test_render_full_contains_text() {
        let mut frame = Frame::new(3, 2);
        frame.draw_text(0, 1, 3, "ok", Rgb::WHITE, Rgb::BLACK);
        let mut output = Vec::new();
        render_full(&frame, &mut output, &mut DiffState::new());
        let text = String::from_utf8_lossy(&output);
        assert!(text.starts_with("\x1b[0m\x1b[H"));
        assert!(text.contains("ok"));
    }
}
