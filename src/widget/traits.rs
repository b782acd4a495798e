//! The `Widget` trait shared by every screen component.

use crate::actor::InputEvent;
use crate::screen::Rect;

/// A screen component with bounds that may react to input.
///
/// Drawing is an inherent `render` method on each widget, since widgets
/// differ in what they need to draw (the log view borrows the log
/// buffer, the chrome widgets only their own state).
pub trait Widget {
    /// Get the current bounds of this widget.
    fn bounds(&self) -> Rect;

    /// Set the bounds of this widget.
    ///
    /// Called when the layout changes (e.g., terminal resize).
    fn set_bounds(&mut self, bounds: Rect);

    /// Handle an input event.
    ///
    /// Returns `true` if the event was consumed by this widget,
    /// `false` if it should propagate to other widgets.
    fn handle_input(&mut self, event: &InputEvent) -> bool;

    /// Check if this widget needs to be redrawn.
    fn needs_redraw(&self) -> bool;

    /// Clear the redraw flag after rendering.
    fn clear_redraw(&mut self);
}
