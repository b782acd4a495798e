//! Widgets: the log view and the chrome around it.
//!
//! The [`LogView`] is the virtualized list over the log buffer. The
//! [`StatusBar`] and [`ProgressBar`] each take one row above it.

mod log_view;
mod progress_bar;
mod row_heights;
mod status_bar;
mod traits;
mod virtual_list;

pub use log_view::{LogView, LogViewConfig, RenderedRows};
pub use progress_bar::{ProgressBar, ProgressBarConfig, ProgressStyle};
pub use row_heights::{measure, wrap, RowHeightCache};
pub use status_bar::{StatusBar, StatusBarConfig};
pub use traits::Widget;
pub use virtual_list::{InfiniteLoader, VirtualList};
