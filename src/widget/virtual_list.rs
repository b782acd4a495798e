//! Virtual list: windowing over rows of varying height.
//!
//! Only rows intersecting the viewport are measured and drawn. The
//! scroll position is an anchor (top row plus the number of its display
//! lines scrolled past), so appending rows never moves what is on
//! screen.
//!
//! Heights come from a caller-supplied `measure` closure; the list keeps
//! no heights itself.

use std::ops::Range;

/// Scroll anchor of a variable-height list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VirtualList {
    top_row: usize,
    top_skip: u16,
    overscan: usize,
}

impl VirtualList {
    /// Create a list scrolled to the top.
    pub const fn new(overscan: usize) -> Self {
        Self {
            top_row: 0,
            top_skip: 0,
            overscan,
        }
    }

    /// First row on screen.
    pub const fn top_row(&self) -> usize {
        self.top_row
    }

    /// Display lines of the first row hidden above the viewport.
    pub const fn top_skip(&self) -> u16 {
        self.top_skip
    }

    /// Rows measured beyond each edge of the viewport.
    pub const fn overscan(&self) -> usize {
        self.overscan
    }

    /// Jump to the first line of the first row.
    pub const fn scroll_to_top(&mut self) {
        self.top_row = 0;
        self.top_skip = 0;
    }

    /// Scroll so the last line of `target` sits on the bottom edge of
    /// the viewport.
    ///
    /// If everything up to `target` is shorter than the viewport, the
    /// list is top-aligned instead.
    pub fn align_end(&mut self, target: usize, viewport: u16, measure: &mut impl FnMut(usize) -> u16) {
        let mut above = 0u16;
        let mut row = target;
        loop {
            let height = measure(row);
            if above.saturating_add(height) >= viewport {
                self.top_row = row;
                self.top_skip = above.saturating_add(height) - viewport;
                return;
            }
            above += height;
            if row == 0 {
                self.scroll_to_top();
                return;
            }
            row -= 1;
        }
    }

    /// The furthest anchor that still fills the viewport.
    fn max_anchor(row_count: usize, viewport: u16, measure: &mut impl FnMut(usize) -> u16) -> (usize, u16) {
        let mut end = Self::new(0);
        if row_count > 0 {
            end.align_end(row_count - 1, viewport, measure);
        }
        (end.top_row, end.top_skip)
    }

    /// Scroll by `delta` display lines; negative scrolls up.
    ///
    /// Stops at the top, and at the bottom where the last row reaches
    /// the bottom edge.
    pub fn scroll_by(
        &mut self,
        delta: isize,
        row_count: usize,
        viewport: u16,
        measure: &mut impl FnMut(usize) -> u16,
    ) {
        if delta < 0 {
            for _ in 0..delta.unsigned_abs() {
                if self.top_skip > 0 {
                    self.top_skip -= 1;
                } else if self.top_row > 0 {
                    self.top_row -= 1;
                    self.top_skip = measure(self.top_row).saturating_sub(1);
                } else {
                    break;
                }
            }
            return;
        }

        let max = Self::max_anchor(row_count, viewport, measure);
        for _ in 0..delta.unsigned_abs() {
            if (self.top_row, self.top_skip) >= max {
                break;
            }
            if self.top_skip + 1 < measure(self.top_row) {
                self.top_skip += 1;
            } else {
                self.top_row += 1;
                self.top_skip = 0;
            }
        }
    }

    /// Pull the anchor back inside the list after rows or heights
    /// changed underneath it.
    pub fn clamp(&mut self, row_count: usize, viewport: u16, measure: &mut impl FnMut(usize) -> u16) {
        if row_count == 0 {
            self.scroll_to_top();
            return;
        }
        if self.top_row >= row_count {
            self.top_row = row_count - 1;
            self.top_skip = 0;
        }
        self.top_skip = self.top_skip.min(measure(self.top_row).saturating_sub(1));

        let max = Self::max_anchor(row_count, viewport, measure);
        if (self.top_row, self.top_skip) > max {
            (self.top_row, self.top_skip) = max;
        }
    }

    /// Rows that intersect the viewport.
    pub fn visible(&self, row_count: usize, viewport: u16, measure: &mut impl FnMut(usize) -> u16) -> Range<usize> {
        let start = self.top_row.min(row_count);
        if viewport == 0 {
            return start..start;
        }

        let mut filled = 0u16;
        let mut row = start;
        let mut skip = self.top_skip;
        while row < row_count && filled < viewport {
            filled = filled.saturating_add(measure(row).saturating_sub(skip));
            skip = 0;
            row += 1;
        }
        start..row
    }

    /// `visible` widened by the overscan on both sides.
    pub fn render_range(&self, visible: &Range<usize>, row_count: usize) -> Range<usize> {
        let start = visible.start.saturating_sub(self.overscan);
        let end = visible.end.saturating_add(self.overscan).min(row_count);
        start..end
    }
}

/// Decides when the list should ask for more rows.
///
/// After each render the visible range, widened by `threshold` rows, is
/// scanned for rows that are not loaded yet. The first such run is
/// returned as a request, at least `minimum_batch` rows long. A range is
/// not returned twice in a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfiniteLoader {
    threshold: usize,
    minimum_batch: usize,
    last_requested: Option<Range<usize>>,
}

impl Default for InfiniteLoader {
    fn default() -> Self {
        Self::new(15, 10)
    }
}

impl InfiniteLoader {
    /// Create a loader.
    pub const fn new(threshold: usize, minimum_batch: usize) -> Self {
        Self {
            threshold,
            minimum_batch,
            last_requested: None,
        }
    }

    /// Range to request for the given visible rows, if any.
    pub fn check(
        &mut self,
        visible: &Range<usize>,
        row_count: usize,
        is_loaded: impl Fn(usize) -> bool,
    ) -> Option<Range<usize>> {
        let scan_start = visible.start.saturating_sub(self.threshold);
        let scan_end = visible.end.saturating_add(self.threshold).min(row_count);

        let first = (scan_start..scan_end).find(|&i| !is_loaded(i))?;
        let run_end = (first..row_count).find(|&i| is_loaded(i)).unwrap_or(row_count);
        let end = run_end.max(first + self.minimum_batch).min(row_count);
        let range = first..end;

        if self.last_requested.as_ref() == Some(&range) {
            return None;
        }
        self.last_requested = Some(range.clone());
        Some(range)
    }

    /// Allow the last range to be requested again.
    pub fn forget(&mut self) {
        self.last_requested = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heights(h: &[u16]) -> impl FnMut(usize) -> u16 + '_ {
        move |i| h.get(i).copied().unwrap_or(1)
    }

    #[test]
    fn test_align_end_short_content_top_aligns() {
        let mut list = VirtualList::new(0);
        list.align_end(2, 10, &mut heights(&[1, 1, 1]));
        assert_eq!((list.top_row(), list.top_skip()), (0, 0));
    }

    #[test]
    fn test_align_end_long_content() {
        let mut list = VirtualList::new(0);
        let h = [2, 2, 2, 2, 2];
        list.align_end(4, 5, &mut heights(&h));
        // Rows 2..=4 give 6 lines; one line of row 2 is hidden.
        assert_eq!((list.top_row(), list.top_skip()), (2, 1));
        assert_eq!(list.visible(5, 5, &mut heights(&h)), 2..5);
    }

    #[test]
    fn test_align_end_tall_row() {
        let mut list = VirtualList::new(0);
        list.align_end(1, 4, &mut heights(&[1, 10]));
        // Only the last four lines of the tall row are shown.
        assert_eq!((list.top_row(), list.top_skip()), (1, 6));
    }

    #[test]
    fn test_scroll_by_moves_through_wrapped_rows() {
        let h = [3, 1, 1, 1, 1, 1];
        let mut list = VirtualList::new(0);
        list.scroll_by(2, h.len(), 2, &mut heights(&h));
        assert_eq!((list.top_row(), list.top_skip()), (0, 2));
        list.scroll_by(1, h.len(), 2, &mut heights(&h));
        assert_eq!((list.top_row(), list.top_skip()), (1, 0));
        list.scroll_by(-2, h.len(), 2, &mut heights(&h));
        assert_eq!((list.top_row(), list.top_skip()), (0, 1));
        list.scroll_by(-10, h.len(), 2, &mut heights(&h));
        assert_eq!((list.top_row(), list.top_skip()), (0, 0));
    }

    #[test]
    fn test_scroll_by_stops_at_bottom() {
        let h = [1; 10];
        let mut list = VirtualList::new(0);
        list.scroll_by(100, h.len(), 4, &mut heights(&h));
        assert_eq!((list.top_row(), list.top_skip()), (6, 0));
    }

    #[test]
    fn test_clamp_after_shrink() {
        let h = [1; 3];
        let mut list = VirtualList::new(0);
        list.top_row = 8;
        list.clamp(h.len(), 2, &mut heights(&h));
        assert_eq!((list.top_row(), list.top_skip()), (1, 0));
    }

    #[test]
    fn test_render_range_overscan() {
        let list = VirtualList::new(3);
        assert_eq!(list.render_range(&(5..10), 12), 2..12);
        assert_eq!(list.render_range(&(1..4), 100), 0..7);
    }

    #[test]
    fn test_loader_requests_trailing_placeholder() {
        let mut loader = InfiniteLoader::new(15, 10);
        let len = 3;
        let loaded = |i: usize| i < len;
        assert_eq!(loader.check(&(0..4), len + 1, loaded), Some(3..4));
        // Same range again is suppressed.
        assert_eq!(loader.check(&(0..4), len + 1, loaded), None);
        // After growth the placeholder moves and is requested again.
        let loaded = |i: usize| i < 4;
        assert_eq!(loader.check(&(0..5), 5, loaded), Some(4..5));
    }

    #[test]
    fn test_loader_threshold() {
        let mut loader = InfiniteLoader::new(5, 10);
        let loaded = |i: usize| i < 100;
        // Placeholder at 100 is beyond visible end + threshold.
        assert_eq!(loader.check(&(0..20), 101, loaded), None);
        assert_eq!(loader.check(&(80..96), 101, loaded), Some(100..101));
    }

    #[test]
    fn test_loader_minimum_batch() {
        let mut loader = InfiniteLoader::new(0, 10);
        assert_eq!(loader.check(&(0..5), 50, |i| i < 2), Some(2..50));
        let mut loader = InfiniteLoader::new(0, 10);
        assert_eq!(loader.check(&(0..5), 50, |i| i < 2 || i >= 4), Some(2..12));
    }

    #[test]
    fn test_loader_forget() {
        let mut loader = InfiniteLoader::default();
        let loaded = |i: usize| i < 1;
        assert!(loader.check(&(0..2), 2, loaded).is_some());
        loader.forget();
        assert!(loader.check(&(0..2), 2, loaded).is_some());
    }
}
