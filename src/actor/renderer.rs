//! Renderer Actor: Dedicated thread for rendering to the terminal.
//!
//! This actor owns terminal output and the frame that is currently on
//! screen. It receives frames from the main loop, diffs them against
//! what is visible, and flushes each frame with a single write.

use super::messages::RenderCommand;
use crate::screen::diff::{render_diff, render_full, DiffState};
use crate::screen::Frame;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use crossterm::{queue, terminal::SetTitle};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{error, trace};

/// Renderer actor that handles terminal output.
pub struct RendererActor {
    /// Handle to the render thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
}

/// Render statistics for debugging/profiling.
#[derive(Debug, Clone, Default)]
pub struct RenderStats {
    /// Total frames rendered.
    pub frames: u64,
    /// Total cells changed across all frames.
    pub cells_changed: u64,
    /// Total bytes written to terminal.
    pub bytes_written: u64,
    /// Smoothed render time in microseconds.
    pub avg_render_us: u64,
}

/// Diffing state and output sink, separate from the thread so it can
/// run against any writer.
pub(crate) struct Renderer<W: Write> {
    /// Frame currently on screen; `None` until the first draw.
    current: Option<Frame>,
    diff_state: DiffState,
    /// Pre-allocated output buffer.
    output: Vec<u8>,
    sink: W,
    stats: RenderStats,
}

impl<W: Write> Renderer<W> {
    pub(crate) fn new(sink: W) -> Self {
        Self {
            current: None,
            diff_state: DiffState::new(),
            output: Vec::with_capacity(65536),
            sink,
            stats: RenderStats::default(),
        }
    }

    /// Draw `next`, redrawing everything if `full` is set or the size
    /// changed.
    pub(crate) fn draw(&mut self, next: Frame, full: bool) -> io::Result<()> {
        let start = Instant::now();
        self.output.clear();

        match &self.current {
            Some(current) if !full && current.width() == next.width() && current.height() == next.height() => {
                let stats = render_diff(current, &next, &mut self.output, &mut self.diff_state);
                self.stats.cells_changed += stats.cells_changed as u64;
            }
            _ => {
                render_full(&next, &mut self.output, &mut self.diff_state);
                self.stats.cells_changed += next.cells().len() as u64;
            }
        }

        if !self.output.is_empty() {
            self.sink.write_all(&self.output)?;
            self.sink.flush()?;
        }
        self.current = Some(next);

        let elapsed = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.stats.frames += 1;
        self.stats.bytes_written += self.output.len() as u64;
        self.stats.avg_render_us = if self.stats.avg_render_us == 0 {
            elapsed
        } else {
            (self.stats.avg_render_us * 15 + elapsed) / 16
        };
        trace!(bytes = self.output.len(), us = elapsed, "frame flushed");

        Ok(())
    }

    pub(crate) fn set_title(&mut self, title: &str) -> io::Result<()> {
        queue!(self.sink, SetTitle(title))?;
        self.sink.flush()
    }

    pub(crate) const fn stats(&self) -> &RenderStats {
        &self.stats
    }

    #[cfg(test)]
    pub(crate) const fn sink(&self) -> &W {
        &self.sink
    }

    /// Apply one command. Returns `false` on shutdown.
    pub(crate) fn apply(&mut self, command: RenderCommand) -> io::Result<bool> {
        match command {
            RenderCommand::FullRedraw(frame) => self.draw(*frame, true)?,
            RenderCommand::Update(frame) => self.draw(*frame, false)?,
            RenderCommand::SetTitle(title) => self.set_title(&title)?,
            RenderCommand::Shutdown => return Ok(false),
        }
        Ok(true)
    }
}

impl RendererActor {
    /// Spawn the renderer actor thread writing to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn the thread.
    pub fn spawn(receiver: Receiver<RenderCommand>) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name("logview-render".to_string())
            .spawn(move || {
                let mut renderer = Renderer::new(io::stdout());
                if let Err(e) = Self::run_loop(&receiver, &shutdown_clone, &mut renderer) {
                    error!(error = %e, "render thread error");
                }
                let stats = renderer.stats();
                trace!(frames = stats.frames, bytes = stats.bytes_written, "render thread exiting");
            })?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
        })
    }

    /// Signal the render thread to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the render thread to finish.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn run_loop<W: Write>(
        receiver: &Receiver<RenderCommand>,
        shutdown: &AtomicBool,
        renderer: &mut Renderer<W>,
    ) -> io::Result<()> {
        while !shutdown.load(Ordering::Relaxed) {
            match receiver.recv_timeout(Duration::from_millis(16)) {
                Ok(command) => {
                    if !renderer.apply(command)? {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        Ok(())
    }
}

impl Drop for RendererActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
