//! Cell: one terminal column of one screen row.
//!
//! Cells store their grapheme inline. A log viewer draws plain text, so
//! graphemes longer than the inline storage (emoji ZWJ sequences and
//! the like) are reduced to their first scalar value instead of being
//! spilled to side storage.

use bitflags::bitflags;

/// Maximum number of UTF-8 bytes a cell stores inline.
const INLINE_BYTES: usize = 4;

/// True-color RGB representation.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black (0, 0, 0)
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// White (255, 255, 255)
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Default foreground for log text.
    pub const DEFAULT_FG: Self = Self::new(220, 220, 220);
    /// Default background.
    pub const DEFAULT_BG: Self = Self::BLACK;
}

impl std::fmt::Debug for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

bitflags! {
    /// Text style modifiers.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
    pub struct Modifiers: u8 {
        /// Bold text
        const BOLD = 0b0000_0001;
        /// Dim/faint text
        const DIM = 0b0000_0010;
    }
}

/// A single terminal cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Inline UTF-8 bytes of the grapheme.
    symbol: [u8; INLINE_BYTES],
    /// Number of valid bytes in `symbol`.
    len: u8,
    /// Display width (0 = continuation of a wide grapheme, 1 or 2).
    width: u8,
    fg: Rgb,
    bg: Rgb,
    modifiers: Modifiers,
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Cell {
    /// A blank cell (space with default colors).
    pub const EMPTY: Self = Self {
        symbol: [b' ', 0, 0, 0],
        len: 1,
        width: 1,
        fg: Rgb::DEFAULT_FG,
        bg: Rgb::DEFAULT_BG,
        modifiers: Modifiers::empty(),
    };

    /// Create a cell holding a single character.
    ///
    /// Control characters are stored as a space so they never reach the
    /// terminal raw.
    pub fn new(c: char) -> Self {
        let c = if c.is_control() { ' ' } else { c };
        let mut symbol = [0u8; INLINE_BYTES];
        let len = u8::try_from(c.encode_utf8(&mut symbol).len()).unwrap_or(1);
        let width = unicode_width::UnicodeWidthChar::width(c).unwrap_or(1).clamp(1, 2);

        Self {
            symbol,
            len,
            width: u8::try_from(width).unwrap_or(1),
            ..Self::EMPTY
        }
    }

    /// Create a cell from a grapheme cluster.
    ///
    /// Clusters that do not fit inline keep only their first character.
    pub fn from_grapheme(grapheme: &str) -> Self {
        let Some(first) = grapheme.chars().next() else {
            return Self::EMPTY;
        };
        if grapheme.len() > INLINE_BYTES || first.is_control() {
            return Self::new(first);
        }

        let mut symbol = [0u8; INLINE_BYTES];
        symbol[..grapheme.len()].copy_from_slice(grapheme.as_bytes());
        let width = unicode_width::UnicodeWidthStr::width(grapheme).clamp(1, 2);

        Self {
            symbol,
            len: u8::try_from(grapheme.len()).unwrap_or(0),
            width: u8::try_from(width).unwrap_or(1),
            ..Self::EMPTY
        }
    }

    /// The placeholder cell written after a double-width grapheme.
    pub const fn continuation() -> Self {
        Self {
            symbol: [0; INLINE_BYTES],
            len: 0,
            width: 0,
            ..Self::EMPTY
        }
    }

    /// Get the grapheme as a string slice (empty for continuations).
    pub fn symbol(&self) -> &str {
        std::str::from_utf8(&self.symbol[..self.len as usize]).unwrap_or(" ")
    }

    /// Whether this cell continues the wide grapheme to its left.
    #[inline]
    pub const fn is_continuation(&self) -> bool {
        self.width == 0
    }

    /// Display width in columns.
    #[inline]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Foreground color.
    #[inline]
    pub const fn fg(&self) -> Rgb {
        self.fg
    }

    /// Background color.
    #[inline]
    pub const fn bg(&self) -> Rgb {
        self.bg
    }

    /// Text modifiers.
    #[inline]
    pub const fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Set the foreground color (builder pattern).
    #[inline]
    #[must_use]
    pub const fn with_fg(mut self, fg: Rgb) -> Self {
        self.fg = fg;
        self
    }

    /// Set the background color (builder pattern).
    #[inline]
    #[must_use]
    pub const fn with_bg(mut self, bg: Rgb) -> Self {
        self.bg = bg;
        self
    }

    /// Set the modifiers (builder pattern).
    #[inline]
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("symbol", &self.symbol())
            .field("width", &self.width)
            .field("fg", &self.fg)
            .field("bg", &self.bg)
            .field("modifiers", &self.modifiers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_ascii() {
        let cell = Cell::new('A');
        assert_eq!(cell.symbol(), "A");
        assert_eq!(cell.width(), 1);
    }

    #[test]
    fn test_cell_wide() {
        let cell = Cell::from_grapheme("日");
        assert_eq!(cell.symbol(), "日");
        assert_eq!(cell.width(), 2);
    }

    #[test]
    fn test_cell_control_becomes_space() {
        assert_eq!(Cell::new('\t').symbol(), " ");
        assert_eq!(Cell::from_grapheme("\u{1b}").symbol(), " ");
    }

    #[test]
    fn test_cell_long_cluster_keeps_first_char() {
        let cell = Cell::from_grapheme("👨‍👩‍👧");
        assert_eq!(cell.symbol(), "👨");
    }

    #[test]
    fn test_cell_builder_pattern() {
        let cell = Cell::new('X')
            .with_fg(Rgb::new(255, 0, 0))
            .with_modifiers(Modifiers::BOLD | Modifiers::DIM);
        assert_eq!(cell.fg(), Rgb::new(255, 0, 0));
        assert!(cell.modifiers().contains(Modifiers::BOLD));
        assert_ne!(cell, Cell::new('X'));
    }
}
