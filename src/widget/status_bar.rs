//! Status Bar Widget: connection state, line count and auto-scroll.
//!
//! A single row with three sections. The right section doubles as the
//! label of the auto-scroll toggle.

use super::traits::Widget;
use crate::actor::InputEvent;
use crate::screen::{Cell, Frame, Modifiers, Rect, Rgb};
use crate::stream::ConnectionState;
use unicode_width::UnicodeWidthStr;

/// Configuration for the status bar widget.
#[derive(Debug, Clone)]
pub struct StatusBarConfig {
    /// Background color.
    pub bg: Rgb,
    /// Endpoint text color.
    pub url_fg: Rgb,
    /// Line count color.
    pub count_fg: Rgb,
    /// Toggle label color.
    pub toggle_fg: Rgb,
}

impl Default for StatusBarConfig {
    fn default() -> Self {
        Self {
            bg: Rgb::new(40, 40, 40),
            url_fg: Rgb::new(150, 150, 150),
            count_fg: Rgb::WHITE,
            toggle_fg: Rgb::new(100, 200, 100),
        }
    }
}

/// Indicator color for a connection state.
const fn state_color(state: ConnectionState) -> Rgb {
    match state {
        ConnectionState::Idle => Rgb::new(150, 150, 150),
        ConnectionState::Connecting => Rgb::new(220, 180, 60),
        ConnectionState::Open => Rgb::new(80, 200, 120),
        ConnectionState::Closed => Rgb::new(220, 80, 80),
    }
}

/// Top row of the viewer.
#[derive(Debug)]
pub struct StatusBar {
    url: String,
    state: ConnectionState,
    lines: usize,
    auto_scroll: bool,
    bounds: Rect,
    config: StatusBarConfig,
    dirty: bool,
}

impl StatusBar {
    /// Create a status bar for the stream at `url`.
    pub fn new(bounds: Rect, url: impl Into<String>) -> Self {
        Self::with_config(bounds, url, StatusBarConfig::default())
    }

    /// Create a status bar with custom configuration.
    pub fn with_config(bounds: Rect, url: impl Into<String>, config: StatusBarConfig) -> Self {
        Self {
            url: url.into(),
            state: ConnectionState::Idle,
            lines: 0,
            auto_scroll: true,
            bounds,
            config,
            dirty: true,
        }
    }

    /// Update the displayed values. Only marks the bar dirty when
    /// something changed.
    pub fn set_status(&mut self, state: ConnectionState, lines: usize, auto_scroll: bool) {
        if (state, lines, auto_scroll) != (self.state, self.lines, self.auto_scroll) {
            self.state = state;
            self.lines = lines;
            self.auto_scroll = auto_scroll;
            self.dirty = true;
        }
    }

    /// Left section text.
    pub fn left(&self) -> String {
        format!("● {} {}", self.state.label(), self.url)
    }

    /// Center section text.
    pub fn center(&self) -> String {
        match self.lines {
            1 => "1 line".to_string(),
            n => format!("{n} lines"),
        }
    }

    /// Right section text: the auto-scroll toggle label.
    pub fn right(&self) -> String {
        let mode = if self.auto_scroll { "on" } else { "off" };
        format!("[a] auto-scroll {mode}")
    }

    /// Draw the bar into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let Rect { x, y, width, .. } = self.bounds;
        if width == 0 {
            return;
        }
        let bg = self.config.bg;
        let right_edge = self.bounds.right();
        frame.fill_rect(x, y, width, 1, Cell::EMPTY.with_bg(bg));

        // Right first: the toggle label must stay visible on narrow
        // terminals.
        let right = self.right();
        let right_width = u16::try_from(right.width()).unwrap_or(width).min(width);
        let right_start = right_edge - right_width;
        frame.draw_styled_text(right_start, y, right_edge, &right, self.config.toggle_fg, bg, Modifiers::BOLD);

        let left_limit = right_start.saturating_sub(1);
        let mut col = x + frame.draw_text(x, y, left_limit, "●", state_color(self.state), bg);
        let detail = format!(" {} {}", self.state.label(), self.url);
        col += frame.draw_text(col, y, left_limit, &detail, self.config.url_fg, bg);

        let center = self.center();
        let center_width = u16::try_from(center.width()).unwrap_or(width);
        let center_start = x + width.saturating_sub(center_width) / 2;
        if center_start > col && center_start + center_width < right_start {
            frame.draw_text(center_start, y, right_start, &center, self.config.count_fg, bg);
        }
    }
}

impl Widget for StatusBar {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.dirty = true;
    }

    fn handle_input(&mut self, _event: &InputEvent) -> bool {
        false
    }

    fn needs_redraw(&self) -> bool {
        self.dirty
    }

    fn clear_redraw(&mut self) {
        self.dirty = false;
    }
}
