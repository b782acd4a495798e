//! Configuration: built-in defaults, overlaid by an optional TOML file,
//! overlaid by command-line flags (see `main.rs`).

use crate::actor::EngineConfig;
use crate::error::{Error, Result};
use crate::stream::StreamConfig;
use crate::widget::{LogViewConfig, ProgressBarConfig, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tungstenite::http::Uri;

/// Log source used when none is configured.
pub const DEFAULT_URL: &str = "wss://test-log-viewer-backend.stg.onepunch.agency/view-log-ws";

/// Expected size of the whole log, for the progress estimate.
pub const DEFAULT_EXPECTED_TOTAL_BYTES: u64 = 1_060_000_000;

/// Viewer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// WebSocket endpoint of the log source.
    pub url: String,
    /// Token sent once the connection opens.
    pub greeting: String,
    /// Token sent to ask for more lines.
    pub request_token: String,
    /// Expected total log size in bytes.
    pub expected_total_bytes: u64,
    /// Whether auto-scroll starts enabled.
    pub auto_scroll: bool,
    /// Rows measured beyond each edge of the viewport.
    pub overscan: usize,
    /// Rows of look-ahead before more lines are requested.
    pub load_threshold: usize,
    /// Smallest range of rows requested at once.
    pub minimum_batch: usize,
    /// Look of the progress bar: `solid`, `ascii` or `block`.
    pub progress_style: ProgressStyle,
    /// Socket read timeout of the connection thread, in milliseconds.
    pub poll_interval_ms: u64,
    /// Redraw rate.
    pub target_fps: u32,
    /// Capture the mouse for wheel scrolling.
    pub enable_mouse: bool,
    /// Directory for the rolling log file.
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            greeting: "Hello Server!".to_string(),
            request_token: "next".to_string(),
            expected_total_bytes: DEFAULT_EXPECTED_TOTAL_BYTES,
            auto_scroll: true,
            overscan: 3,
            load_threshold: 15,
            minimum_batch: 10,
            progress_style: ProgressStyle::Block,
            poll_interval_ms: 50,
            target_fps: 30,
            enable_mouse: true,
            log_dir: std::env::temp_dir().join("logview"),
        }
    }
}

impl Config {
    /// Read a TOML file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&text).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Parse TOML text. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on malformed input.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Check that the configuration can be used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty or non-WebSocket URL, or a
    /// zero expected total.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::Config("url must not be empty".into()));
        }
        let uri: Uri = self
            .url
            .parse()
            .map_err(|e| Error::Config(format!("invalid url {:?}: {e}", self.url)))?;
        if !matches!(uri.scheme_str(), Some("ws" | "wss")) {
            return Err(Error::Config(format!("url {:?} must use ws:// or wss://", self.url)));
        }
        if uri.host().is_none() {
            return Err(Error::Config(format!("url {:?} has no host", self.url)));
        }
        if self.expected_total_bytes == 0 {
            return Err(Error::Config("expected_total_bytes must be greater than zero".into()));
        }
        Ok(())
    }

    /// Settings for the stream controller.
    pub fn stream(&self) -> StreamConfig {
        StreamConfig {
            url: self.url.clone(),
            greeting: self.greeting.clone(),
            request_token: self.request_token.clone(),
            expected_total_bytes: self.expected_total_bytes,
        }
    }

    /// Settings for the log view.
    pub fn view(&self) -> LogViewConfig {
        LogViewConfig {
            auto_scroll: self.auto_scroll,
            overscan: self.overscan,
            load_threshold: self.load_threshold,
            minimum_batch: self.minimum_batch.max(1),
            ..LogViewConfig::default()
        }
    }

    /// Settings for the progress bar.
    pub fn progress(&self) -> ProgressBarConfig {
        ProgressBarConfig {
            style: self.progress_style,
            ..ProgressBarConfig::default()
        }
    }

    /// Settings for the terminal engine.
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            target_fps: self.target_fps.max(1),
            enable_mouse: self.enable_mouse,
            ..EngineConfig::default()
        }
    }

    /// Read timeout of the connection thread.
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
