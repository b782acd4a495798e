//! Frame: a grid of cells for one full terminal screen.
//!
//! Cells are stored contiguously in row-major order
//! (`index = y * width + x`).

use super::cell::{Cell, Modifiers, Rgb};
use unicode_segmentation::UnicodeSegmentation;

/// A grid of cells representing the terminal screen.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    cells: Vec<Cell>,
    width: u16,
    height: u16,
}

impl Frame {
    /// Create a new frame filled with blank cells.
    ///
    /// # Panics
    /// Panics if width or height is 0.
    pub fn new(width: u16, height: u16) -> Self {
        assert!(width > 0 && height > 0, "Frame dimensions must be non-zero");
        Self {
            cells: vec![Cell::EMPTY; usize::from(width) * usize::from(height)],
            width,
            height,
        }
    }

    /// Frame width in columns.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Frame height in rows.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The underlying cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Convert (x, y) coordinates to a linear index.
    #[inline]
    pub fn index_of(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// Get the cell at (x, y).
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index_of(x, y).map(|i| &self.cells[i])
    }

    /// Set the cell at (x, y). Returns `false` when out of bounds.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if let Some(idx) = self.index_of(x, y) {
            self.cells[idx] = cell;
            true
        } else {
            false
        }
    }

    /// Write a grapheme at (x, y), adding a continuation cell for
    /// double-width graphemes.
    ///
    /// Returns the display width written, or 0 if out of bounds or if a
    /// wide grapheme would straddle the right edge.
    pub fn set_grapheme(&mut self, x: u16, y: u16, grapheme: &str, fg: Rgb, bg: Rgb) -> u16 {
        let cell = Cell::from_grapheme(grapheme).with_fg(fg).with_bg(bg);
        let width = u16::from(cell.width());
        if x.saturating_add(width) > self.width || y >= self.height {
            return 0;
        }
        self.set(x, y, cell);
        if width == 2 {
            self.set(x + 1, y, Cell::continuation().with_bg(bg));
        }
        width
    }

    /// Draw `text` starting at (x, y), stopping at `max_x` (exclusive).
    ///
    /// Returns the number of columns used.
    pub fn draw_text(&mut self, x: u16, y: u16, max_x: u16, text: &str, fg: Rgb, bg: Rgb) -> u16 {
        self.draw_styled_text(x, y, max_x, text, fg, bg, Modifiers::empty())
    }

    /// Like [`Frame::draw_text`], with `modifiers` applied to every
    /// cell written.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_styled_text(
        &mut self,
        x: u16,
        y: u16,
        max_x: u16,
        text: &str,
        fg: Rgb,
        bg: Rgb,
        modifiers: Modifiers,
    ) -> u16 {
        let limit = max_x.min(self.width);
        let mut col = x;
        for grapheme in text.graphemes(true) {
            if col >= limit {
                break;
            }
            let cell = Cell::from_grapheme(grapheme);
            if col + u16::from(cell.width()) > limit {
                break;
            }
            let start = col;
            col += self.set_grapheme(col, y, grapheme, fg, bg);
            if !modifiers.is_empty() {
                for c in start..col {
                    if let Some(idx) = self.index_of(c, y) {
                        self.cells[idx] = self.cells[idx].with_modifiers(modifiers);
                    }
                }
            }
        }
        col - x
    }

    /// Fill a rectangular region with a cell.
    pub fn fill_rect(&mut self, x: u16, y: u16, width: u16, height: u16, cell: Cell) {
        for row in y..y.saturating_add(height).min(self.height) {
            for col in x..x.saturating_add(width).min(self.width) {
                if let Some(idx) = self.index_of(col, row) {
                    self.cells[idx] = cell;
                }
            }
        }
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Resize the frame, keeping the overlapping top-left content.
    pub fn resize(&mut self, new_width: u16, new_height: u16) {
        if new_width == self.width && new_height == self.height {
            return;
        }

        let mut cells = vec![Cell::EMPTY; usize::from(new_width) * usize::from(new_height)];
        let copy_width = usize::from(self.width.min(new_width));
        for y in 0..usize::from(self.height.min(new_height)) {
            let old_start = y * usize::from(self.width);
            let new_start = y * usize::from(new_width);
            cells[new_start..new_start + copy_width]
                .copy_from_slice(&self.cells[old_start..old_start + copy_width]);
        }

        self.cells = cells;
        self.width = new_width;
        self.height = new_height;
    }

    /// Read back a row as text, skipping continuation cells.
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .filter(|c| !c.is_continuation())
            .map(Cell::symbol)
            .collect()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_new() {
        let frame = Frame::new(80, 24);
        assert_eq!(frame.width(), 80);
        assert_eq!(frame.height(), 24);
        assert_eq!(frame.cells().len(), 80 * 24);
    }

    #[test]
    #[should_panic(expected = "non-zero")]
    fn test_frame_zero_width() {
        Frame::new(0, 24);
    }

    #[test]
    fn test_frame_bounds() {
        let mut frame = Frame::new(10, 2);
        assert!(frame.set(9, 1, Cell::new('x')));
        assert!(!frame.set(10, 1, Cell::new('x')));
        assert!(frame.get(0, 2).is_none());
    }

    #[test]
    fn test_draw_text_clips() {
        let mut frame = Frame::new(8, 1);
        let used = frame.draw_text(2, 0, 6, "abcdefgh", Rgb::WHITE, Rgb::BLACK);
        assert_eq!(used, 4);
        assert_eq!(frame.row_text(0), "  abcd  ");
    }

    #[test]
    fn test_styled_text_sets_modifiers() {
        let mut frame = Frame::new(6, 1);
        frame.draw_styled_text(0, 0, 6, "ab", Rgb::WHITE, Rgb::BLACK, Modifiers::BOLD);
        assert_eq!(frame.get(0, 0).unwrap().modifiers(), Modifiers::BOLD);
        assert_eq!(frame.get(1, 0).unwrap().modifiers(), Modifiers::BOLD);
        assert!(frame.get(2, 0).unwrap().modifiers().is_empty());
    }

    #[test]
    fn test_wide_grapheme_at_edge_is_dropped() {
        let mut frame = Frame::new(3, 1);
        assert_eq!(frame.draw_text(0, 0, 3, "a日本", Rgb::WHITE, Rgb::BLACK), 3);
        assert_eq!(frame.row_text(0), "a日");
        assert!(frame.get(2, 0).unwrap().is_continuation());
    }

    #[test]
    fn test_frame_resize_preserves_overlap() {
        let mut frame = Frame::new(10, 5);
        frame.set(3, 3, Cell::new('X'));
        frame.resize(4, 4);
        assert_eq!(frame.get(3, 3).unwrap().symbol(), "X");
        frame.resize(20, 10);
        assert_eq!(frame.get(3, 3).unwrap().symbol(), "X");
        assert_eq!(frame.cells().len(), 200);
    }
}
