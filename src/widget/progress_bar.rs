//! Progress Bar Widget: received bytes against the expected total.
//!
//! The bar draws the percentage with two decimals. Values past 100 are
//! shown as they are; only the fill is clamped.

use super::traits::Widget;
use crate::actor::InputEvent;
use crate::screen::{Cell, Frame, Rect, Rgb};
use serde::{Deserialize, Serialize};

/// Visual style for the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStyle {
    /// Classic solid bar: ████████░░░░
    Solid,
    /// ASCII style: ========
    Ascii,
    /// Block characters: ▓▓▓▓▓▓░░░░
    #[default]
    Block,
}

/// Configuration for the progress bar widget.
#[derive(Debug, Clone)]
pub struct ProgressBarConfig {
    /// Style of the bar.
    pub style: ProgressStyle,
    /// Filled portion color.
    pub filled_fg: Rgb,
    /// Empty portion color.
    pub empty_fg: Rgb,
    /// Background color.
    pub bg: Rgb,
    /// Percentage text color.
    pub percentage_fg: Rgb,
    /// Label drawn before the bar.
    pub label: String,
    /// Label color.
    pub label_fg: Rgb,
}

impl Default for ProgressBarConfig {
    fn default() -> Self {
        Self {
            style: ProgressStyle::Block,
            filled_fg: Rgb::new(0, 200, 100),
            empty_fg: Rgb::new(60, 60, 60),
            bg: Rgb::new(30, 30, 30),
            percentage_fg: Rgb::WHITE,
            label: "received".to_string(),
            label_fg: Rgb::new(150, 150, 150),
        }
    }
}

/// A horizontal progress bar showing a percentage.
#[derive(Debug)]
pub struct ProgressBar {
    /// Current percentage, two decimals, not clamped.
    percent: f64,
    bounds: Rect,
    config: ProgressBarConfig,
    dirty: bool,
}

impl ProgressBar {
    /// Create a new progress bar with the given bounds.
    pub fn new(bounds: Rect) -> Self {
        Self::with_config(bounds, ProgressBarConfig::default())
    }

    /// Create a new progress bar with custom configuration.
    pub const fn with_config(bounds: Rect, config: ProgressBarConfig) -> Self {
        Self {
            percent: 0.0,
            bounds,
            config,
            dirty: true,
        }
    }

    /// Set the percentage. Negative and NaN values count as zero.
    pub fn set_percent(&mut self, percent: f64) {
        let percent = if percent.is_nan() { 0.0 } else { percent.max(0.0) };
        if (percent - self.percent).abs() > f64::EPSILON {
            self.percent = percent;
            self.dirty = true;
        }
    }

    /// Current percentage.
    pub const fn percent(&self) -> f64 {
        self.percent
    }

    /// Percentage as drawn, e.g. `"66.67%"`.
    pub fn percent_text(&self) -> String {
        format!("{:.2}%", self.percent)
    }

    /// Filled cells for a bar `bar_width` cells wide.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn filled_cells(&self, bar_width: u16) -> u16 {
        let fraction = (self.percent / 100.0).clamp(0.0, 1.0);
        (fraction * f64::from(bar_width)).round() as u16
    }

    const fn style_chars(&self) -> (char, char) {
        match self.config.style {
            ProgressStyle::Solid => ('█', '░'),
            ProgressStyle::Ascii => ('=', ' '),
            ProgressStyle::Block => ('▓', '░'),
        }
    }

    /// Draw the bar into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let Rect { x, y, width, .. } = self.bounds;
        let bg = self.config.bg;
        let right_edge = self.bounds.right();
        frame.fill_rect(x, y, width, 1, Cell::EMPTY.with_bg(bg));

        let pct = format!(" {:>7}", self.percent_text());
        let pct_width = u16::try_from(pct.len()).unwrap_or(width).min(width);
        let pct_start = right_edge - pct_width;
        frame.draw_text(pct_start, y, right_edge, &pct, self.config.percentage_fg, bg);

        let mut col = x;
        if !self.config.label.is_empty() {
            col += frame.draw_text(col, y, pct_start, &self.config.label, self.config.label_fg, bg);
            col += frame.draw_text(col, y, pct_start, " ", self.config.label_fg, bg);
        }

        let bar_width = pct_start.saturating_sub(col);
        let filled = self.filled_cells(bar_width);
        let (filled_char, empty_char) = self.style_chars();
        for i in 0..bar_width {
            let (c, fg) = if i < filled {
                (filled_char, self.config.filled_fg)
            } else {
                (empty_char, self.config.empty_fg)
            };
            frame.set(col + i, y, Cell::new(c).with_fg(fg).with_bg(bg));
        }
    }
}

impl Widget for ProgressBar {
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
