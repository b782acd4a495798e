//! Row heights: line wrapping and the lazily filled height cache.

use crate::screen::Cell;
use unicode_segmentation::UnicodeSegmentation;

/// Split `text` into display rows no wider than `width` columns.
///
/// Breaks fall between grapheme clusters. Always yields at least one
/// row, so empty lines still take up space. A grapheme wider than the
/// whole row gets a row to itself.
pub fn wrap(text: &str, width: u16) -> Vec<&str> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut start = 0;
    let mut used = 0u16;

    for (offset, grapheme) in text.grapheme_indices(true) {
        let w = u16::from(Cell::from_grapheme(grapheme).width());
        if used > 0 && used + w > width {
            rows.push(&text[start..offset]);
            start = offset;
            used = 0;
        }
        used += w;
    }
    rows.push(&text[start..]);
    rows
}

/// Number of display rows `text` occupies at `width`.
pub fn measure(text: &str, width: u16) -> u16 {
    u16::try_from(wrap(text, width).len()).unwrap_or(u16::MAX)
}

/// Measured row heights, keyed by row index.
///
/// Heights are only valid for the width they were measured at, so a
/// width change drops every entry. Growth of the log never removes
/// entries; [`Self::invalidate_from`] does.
#[derive(Debug, Default, Clone)]
pub struct RowHeightCache {
    width: u16,
    heights: Vec<Option<u16>>,
}

impl RowHeightCache {
    /// Create an empty cache for rows `width` columns wide.
    pub const fn new(width: u16) -> Self {
        Self {
            width,
            heights: Vec::new(),
        }
    }

    /// Width the cached heights were measured at.
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Change the measuring width. Clears the cache if it differs.
    pub fn set_width(&mut self, width: u16) {
        if width != self.width {
            self.width = width;
            self.heights.clear();
        }
    }

    /// Cached height of `index`, if measured.
    pub fn get(&self, index: usize) -> Option<u16> {
        self.heights.get(index).copied().flatten()
    }

    /// Record the height of `index`.
    pub fn insert(&mut self, index: usize, height: u16) {
        if index >= self.heights.len() {
            self.heights.resize(index + 1, None);
        }
        self.heights[index] = Some(height);
    }

    /// Height of row `index` holding `text`, measuring it on first use.
    pub fn get_or_measure(&mut self, index: usize, text: &str) -> u16 {
        if let Some(height) = self.get(index) {
            return height;
        }
        let height = measure(text, self.width);
        self.insert(index, height);
        height
    }

    /// Forget every height at or after `start`.
    pub fn invalidate_from(&mut self, start: usize) {
        self.heights.truncate(start);
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.heights.clear();
    }

    /// Number of rows with a cached height.
    pub fn measured(&self) -> usize {
        self.heights.iter().filter(|h| h.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_ascii() {
        assert_eq!(wrap("abcdefg", 3), ["abc", "def", "g"]);
        assert_eq!(wrap("abc", 3), ["abc"]);
        assert_eq!(wrap("", 10), [""]);
    }

    #[test]
    fn test_wrap_wide_graphemes() {
        // Each ideograph is two columns; the third would straddle.
        assert_eq!(wrap("日本語", 5), ["日本", "語"]);
        // A wide grapheme in a one-column view still advances.
        assert_eq!(wrap("日本", 1), ["日", "本"]);
        // Combining marks stay with their base.
        assert_eq!(wrap("e\u{301}e\u{301}", 1), ["e\u{301}", "e\u{301}"]);
    }

    #[test]
    fn test_measure_matches_wrap() {
        for text in ["", "a", "hello world", "日本語テキスト", "mixed 日本 text"] {
            for width in 1..12 {
                assert_eq!(usize::from(measure(text, width)), wrap(text, width).len());
            }
        }
    }

    #[test]
    fn test_cache_measures_once() {
        let mut cache = RowHeightCache::new(4);
        assert_eq!(cache.get(2), None);
        assert_eq!(cache.get_or_measure(2, "abcdefgh"), 2);
        // Cached value wins over a different text.
        assert_eq!(cache.get_or_measure(2, "a"), 2);
        assert_eq!(cache.measured(), 1);
    }

    #[test]
    fn test_invalidate_from() {
        let mut cache = RowHeightCache::new(10);
        for i in 0..5 {
            cache.insert(i, 1);
        }
        cache.invalidate_from(3);
        assert_eq!(cache.get(2), Some(1));
        assert_eq!(cache.get(3), None);
        assert_eq!(cache.get(4), None);
        // Past the end is a no-op.
        cache.invalidate_from(100);
        assert_eq!(cache.measured(), 3);
    }

    #[test]
    fn test_width_change_clears() {
        let mut cache = RowHeightCache::new(10);
        cache.insert(0, 3);
        cache.set_width(10);
        assert_eq!(cache.get(0), Some(3));
        cache.set_width(20);
        assert_eq!(cache.get(0), None);
        assert_eq!(cache.width(), 20);
    }
}
