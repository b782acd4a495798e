//! Log View: virtualized, variable-height rendering of the log buffer.
//!
//! The view never owns lines. Each render borrows the [`LogBuffer`]
//! read-only, measures only the rows near the viewport, and reports
//! which rows it would like loaded next. Asking for them goes through
//! [`LogView::load_more_rows`], the view's only way to reach the stream.
//!
//! # Scroll policy
//!
//! With auto-scroll on, every change of the buffer size schedules a
//! scroll that puts the last line on the bottom edge. Turning auto-scroll
//! on schedules the same scroll; turning it off leaves the view where it
//! is.

use super::row_heights::{wrap, RowHeightCache};
use super::traits::Widget;
use super::virtual_list::{InfiniteLoader, VirtualList};
use crate::actor::{InputEvent, KeyCode};
use crate::screen::{Cell, Frame, Modifiers, Rect, Rgb};
use crate::stream::{LoadMore, LogBuffer, MoreRows};
use std::ops::Range;
use tracing::trace;

/// Lines moved per mouse wheel notch.
const WHEEL_LINES: isize = 3;

/// Text shown in the trailing placeholder row.
const PLACEHOLDER: &str = "…";

/// Configuration for the log view.
#[derive(Debug, Clone)]
pub struct LogViewConfig {
    /// Initial auto-scroll setting.
    pub auto_scroll: bool,
    /// Rows measured beyond each edge of the viewport.
    pub overscan: usize,
    /// How close to unloaded rows the viewport gets before loading.
    pub load_threshold: usize,
    /// Smallest range requested at once.
    pub minimum_batch: usize,
    /// Line text color.
    pub fg: Rgb,
    /// Background color.
    pub bg: Rgb,
    /// Placeholder row color.
    pub placeholder_fg: Rgb,
}

impl Default for LogViewConfig {
    fn default() -> Self {
        Self {
            auto_scroll: true,
            overscan: 3,
            load_threshold: 15,
            minimum_batch: 10,
            fg: Rgb::DEFAULT_FG,
            bg: Rgb::DEFAULT_BG,
            placeholder_fg: Rgb::new(100, 100, 100),
        }
    }
}

/// Pending user scroll, applied at the next render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScrollIntent {
    Lines(isize),
    Top,
    Bottom,
}

/// Outcome of one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRows {
    /// Rows that intersect the viewport.
    pub visible: Range<usize>,
    /// Rows the view wants loaded, if any.
    pub load: Option<Range<usize>>,
}

/// Virtualized view over a [`LogBuffer`].
#[derive(Debug)]
pub struct LogView {
    bounds: Rect,
    config: LogViewConfig,
    heights: RowHeightCache,
    list: VirtualList,
    loader: InfiniteLoader,
    auto_scroll: bool,
    /// A scroll to the target row is due at the next render.
    follow_pending: bool,
    intent: Option<ScrollIntent>,
    /// Buffer length as of the last notification or render.
    len: usize,
    /// First row measured by the last render, overscan included.
    measured_from: usize,
    dirty: bool,
}

impl LogView {
    /// Create a view with default configuration.
    pub fn new(bounds: Rect) -> Self {
        Self::with_config(bounds, LogViewConfig::default())
    }

    /// Create a view with custom configuration.
    pub fn with_config(bounds: Rect, config: LogViewConfig) -> Self {
        Self {
            bounds,
            heights: RowHeightCache::new(bounds.width),
            list: VirtualList::new(config.overscan),
            loader: InfiniteLoader::new(config.load_threshold, config.minimum_batch),
            auto_scroll: config.auto_scroll,
            follow_pending: config.auto_scroll,
            intent: None,
            len: 0,
            measured_from: 0,
            config,
            dirty: true,
        }
    }

    /// Whether row `index` holds a received line.
    pub const fn is_row_loaded(&self, index: usize) -> bool {
        index < self.len
    }

    /// Rows in the list: every line plus a trailing placeholder.
    pub const fn row_count(&self) -> usize {
        self.len + 1
    }

    /// Whether auto-scroll is on.
    pub const fn auto_scroll(&self) -> bool {
        self.auto_scroll
    }

    /// Row the view should scroll to, or `None` to leave the scroll
    /// position alone.
    pub const fn scroll_target(&self) -> Option<usize> {
        if self.auto_scroll && self.len > 0 {
            Some(self.len - 1)
        } else {
            None
        }
    }

    /// Flip auto-scroll and return the new setting.
    pub fn toggle_auto_scroll(&mut self) -> bool {
        self.auto_scroll = !self.auto_scroll;
        self.follow_pending = self.auto_scroll;
        self.dirty = true;
        trace!(auto_scroll = self.auto_scroll, "auto-scroll toggled");
        self.auto_scroll
    }

    /// Note that the buffer now holds `len` lines.
    pub fn buffer_changed(&mut self, len: usize) {
        if len == self.len {
            return;
        }
        self.len = len;
        if self.auto_scroll {
            self.follow_pending = true;
        }
        self.dirty = true;
    }

    /// Ask `source` for more rows on behalf of `range`.
    ///
    /// Cached heights are dropped from the first row the last render
    /// measured (or `range.start`, if earlier) so the rows around the
    /// viewport are measured again when drawn. Repeated calls only
    /// repeat the request.
    pub fn load_more_rows(&mut self, range: Range<usize>, source: &mut impl MoreRows) -> LoadMore {
        let outcome = source.load_more();
        self.heights.invalidate_from(range.start.min(self.measured_from));
        self.dirty = true;
        if outcome == LoadMore::Skipped {
            // Try again once the source can take requests.
            self.loader.forget();
        }
        trace!(?range, ?outcome, "load more rows");
        outcome
    }

    /// First row on screen and the lines of it hidden above.
    pub const fn scroll_position(&self) -> (usize, u16) {
        (self.list.top_row(), self.list.top_skip())
    }

    /// Height cache, for inspection.
    pub const fn heights(&self) -> &RowHeightCache {
        &self.heights
    }

    fn push_intent(&mut self, intent: ScrollIntent) {
        self.intent = Some(match (self.intent, intent) {
            (Some(ScrollIntent::Lines(a)), ScrollIntent::Lines(b)) => ScrollIntent::Lines(a.saturating_add(b)),
            (_, next) => next,
        });
        self.dirty = true;
    }

    /// Draw row `index` starting at screen row `y`, skipping its first
    /// `skip` display lines and drawing at most `max_lines`.
    ///
    /// Returns the number of screen rows used.
    pub fn render_row(
        &mut self,
        frame: &mut Frame,
        log: &LogBuffer,
        index: usize,
        y: u16,
        skip: u16,
        max_lines: u16,
    ) -> u16 {
        let x = self.bounds.x;
        let max_x = self.bounds.right();

        let Some(text) = log.get(index) else {
            if skip == 0 && max_lines > 0 {
                frame.draw_styled_text(
                    x,
                    y,
                    max_x,
                    PLACEHOLDER,
                    self.config.placeholder_fg,
                    self.config.bg,
                    Modifiers::DIM,
                );
                return 1;
            }
            return 0;
        };

        let height = self.heights.get_or_measure(index, text);
        let mut drawn = 0;
        for segment in wrap(text, self.bounds.width)
            .into_iter()
            .take(usize::from(height))
            .skip(usize::from(skip))
            .take(usize::from(max_lines))
        {
            frame.draw_text(x, y + drawn, max_x, segment, self.config.fg, self.config.bg);
            drawn += 1;
        }
        drawn
    }

    /// Render the visible rows of `log` into `frame`.
    pub fn render(&mut self, frame: &mut Frame, log: &LogBuffer) -> RenderedRows {
        let viewport = self.bounds.height;
        self.buffer_changed(log.len());
        self.heights.set_width(self.bounds.width);
        let row_count = self.row_count();
        let target = self.scroll_target();

        {
            let len = self.len;
            let heights = &mut self.heights;
            let mut measure = |i: usize| {
                if i < len {
                    heights.get_or_measure(i, &log[i])
                } else {
                    1
                }
            };

            if self.follow_pending {
                if let Some(target) = target {
                    self.list.align_end(target, viewport, &mut measure);
                }
                self.follow_pending = false;
            }
            match self.intent.take() {
                Some(ScrollIntent::Lines(delta)) => self.list.scroll_by(delta, row_count, viewport, &mut measure),
                Some(ScrollIntent::Top) => self.list.scroll_to_top(),
                Some(ScrollIntent::Bottom) => self.list.align_end(len.saturating_sub(1), viewport, &mut measure),
                None => {}
            }
            self.list.clamp(row_count, viewport, &mut measure);

            let visible = self.list.visible(row_count, viewport, &mut measure);
            let measured = self.list.render_range(&visible, row_count);
            self.measured_from = measured.start;
            for i in measured {
                measure(i);
            }
        }

        frame.fill_rect(
            self.bounds.x,
            self.bounds.y,
            self.bounds.width,
            self.bounds.height,
            Cell::EMPTY.with_bg(self.config.bg),
        );

        let (top_row, mut skip) = self.scroll_position();
        let mut y = self.bounds.y;
        let bottom = self.bounds.bottom();
        let mut row = top_row;
        while row < row_count && y < bottom {
            y += self.render_row(frame, log, row, y, skip, bottom - y);
            skip = 0;
            row += 1;
        }

        let visible = top_row..row;
        let len = self.len;
        let load = self.loader.check(&visible, row_count, |i| i < len);
        self.dirty = false;

        RenderedRows { visible, load }
    }
}

impl Widget for LogView {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        if self.auto_scroll {
            self.follow_pending = true;
        }
        self.dirty = true;
    }

    fn handle_input(&mut self, event: &InputEvent) -> bool {
        let page = isize::try_from(self.bounds.height.max(1)).unwrap_or(1);
        match event {
            InputEvent::Key { code, .. } => match code {
                KeyCode::Char('a' | ' ') => {
                    self.toggle_auto_scroll();
                }
                KeyCode::Up => self.push_intent(ScrollIntent::Lines(-1)),
                KeyCode::Down => self.push_intent(ScrollIntent::Lines(1)),
                KeyCode::PageUp => self.push_intent(ScrollIntent::Lines(-page)),
                KeyCode::PageDown => self.push_intent(ScrollIntent::Lines(page)),
                KeyCode::Home => self.push_intent(ScrollIntent::Top),
                KeyCode::End => self.push_intent(ScrollIntent::Bottom),
                _ => return false,
            },
            InputEvent::MouseScroll { x, y, delta } if self.bounds.contains(*x, *y) => {
                self.push_intent(ScrollIntent::Lines(-isize::from(*delta) * WHEEL_LINES));
            }
            _ => return false,
        }
        true
    }

    fn needs_redraw(&self) -> bool {
        self.dirty || self.follow_pending || self.intent.is_some()
    }

    fn clear_redraw(&mut self) {
        self.dirty = false;
    }
}
