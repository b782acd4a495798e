//! logview binary: parse flags, set up logging, run the viewer.

use anyhow::{Context, Result};
use clap::Parser;
use logview::{app, logging, Config};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "logview", version, about = "Stream a remote log into a scrolling terminal view")]
struct Cli {
    /// WebSocket endpoint of the log source.
    url: Option<String>,

    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Expected total log size in bytes, for the progress bar.
    #[arg(long)]
    expected_total_bytes: Option<u64>,

    /// Start with auto-scroll turned off.
    #[arg(long)]
    no_auto_scroll: bool,

    /// Do not capture the mouse.
    #[arg(long)]
    no_mouse: bool,

    /// Directory for the rolling log file.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    /// Flags override the file, the file overrides defaults.
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(url) = self.url {
            config.url = url;
        }
        if let Some(total) = self.expected_total_bytes {
            config.expected_total_bytes = total;
        }
        if self.no_auto_scroll {
            config.auto_scroll = false;
        }
        if self.no_mouse {
            config.enable_mouse = false;
        }
        if let Some(dir) = self.log_dir {
            config.log_dir = dir;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let config = Cli::parse().into_config()?;
    let _guard = logging::init(&config.log_dir)
        .with_context(|| format!("cannot set up logging in {}", config.log_dir.display()))?;

    info!(url = %config.url, "starting");
    app::run(&config).context("viewer failed")?;
    info!("exiting");
    Ok(())
}
