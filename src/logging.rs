//! Logging setup.
//!
//! The terminal belongs to the UI, so log output goes to a daily rolling
//! file through a non-blocking writer.

use crate::error::Result;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "logview=info";

/// File name prefix of the rolling log.
pub const LOG_FILE: &str = "logview.log";

/// Install the global subscriber writing into `log_dir`.
///
/// Keep the returned guard alive until exit; dropping it flushes
/// buffered lines.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn init(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_thread_names(true)
        .try_init();

    Ok(guard)
}
