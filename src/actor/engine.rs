//! Engine: the terminal session and the actors that serve it.
//!
//! The engine puts the terminal into raw mode, spawns the input and
//! renderer actors, and owns the frame the application draws into.
//! Dropping it stops the actors and restores the terminal.

use super::messages::{InputEvent, RenderCommand};
use super::{InputActor, RendererActor};
use crate::error::Result;
use crate::screen::{Frame, Rect};
use crossbeam_channel::{bounded, Receiver, Sender};
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io;
use std::time::Duration;
use tracing::debug;

/// Configuration for the Engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Target frames per second.
    pub target_fps: u32,
    /// Input poll timeout.
    pub input_poll_timeout: Duration,
    /// Whether to enable mouse capture (for wheel scrolling).
    pub enable_mouse: bool,
    /// Whether to use alternate screen buffer.
    pub alternate_screen: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: 30,
            input_poll_timeout: Duration::from_millis(10),
            enable_mouse: true,
            alternate_screen: true,
        }
    }
}

impl EngineConfig {
    /// Time between frames at the target rate.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.target_fps.max(1)
    }
}

/// Terminal session plus input and renderer actors.
pub struct Engine {
    config: EngineConfig,
    input_rx: Receiver<InputEvent>,
    render_tx: Sender<RenderCommand>,
    input_actor: Option<InputActor>,
    renderer_actor: Option<RendererActor>,
    /// Frame the application draws into.
    frame: Frame,
    /// Last title sent, to skip redundant updates.
    title: String,
}

impl Engine {
    /// Set up the terminal and spawn the actors.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup fails or an actor thread
    /// cannot be spawned.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        let (width, height) = terminal::size()?;

        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        if config.alternate_screen {
            execute!(stdout, EnterAlternateScreen)?;
        }
        if config.enable_mouse {
            execute!(stdout, EnableMouseCapture)?;
        }
        execute!(stdout, cursor::Hide)?;

        let (input_tx, input_rx) = bounded::<InputEvent>(64);
        let (render_tx, render_rx) = bounded::<RenderCommand>(16);

        // From here on Drop restores the terminal if a spawn fails.
        let mut engine = Self {
            config,
            input_rx,
            render_tx,
            input_actor: None,
            renderer_actor: None,
            frame: Frame::new(width.max(1), height.max(1)),
            title: String::new(),
        };
        engine.input_actor = Some(InputActor::spawn(input_tx, engine.config.input_poll_timeout)?);
        engine.renderer_actor = Some(RendererActor::spawn(render_rx)?);
        debug!(width, height, "terminal session started");

        Ok(engine)
    }

    /// Engine configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Area covered by the frame.
    pub const fn area(&self) -> Rect {
        Rect::from_size(self.frame.width(), self.frame.height())
    }

    /// Frame to draw the next screen into.
    pub const fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    /// Input events, for `select!`.
    pub const fn input_receiver(&self) -> &Receiver<InputEvent> {
        &self.input_rx
    }

    /// Send the current frame to be diffed against the screen.
    pub fn present(&self) {
        let _ = self.render_tx.send(RenderCommand::Update(Box::new(self.frame.clone())));
    }

    /// Send the current frame to be drawn from scratch.
    pub fn present_full(&self) {
        let _ = self.render_tx.send(RenderCommand::FullRedraw(Box::new(self.frame.clone())));
    }

    /// Set the terminal window title if it changed.
    pub fn set_title(&mut self, title: &str) {
        if self.title != title {
            title.clone_into(&mut self.title);
            let _ = self.render_tx.send(RenderCommand::SetTitle(title.to_owned()));
        }
    }

    /// Follow a terminal resize. The next present redraws everything.
    pub fn handle_resize(&mut self, width: u16, height: u16) {
        self.frame.resize(width.max(1), height.max(1));
        self.frame.clear();
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(actor) = self.input_actor.take() {
            actor.join();
        }
        let _ = self.render_tx.send(RenderCommand::Shutdown);
        if let Some(actor) = self.renderer_actor.take() {
            actor.join();
        }

        let mut stdout = io::stdout();
        let _ = execute!(stdout, cursor::Show);
        if self.config.enable_mouse {
            let _ = execute!(stdout, DisableMouseCapture);
        }
        if self.config.alternate_screen {
            let _ = execute!(stdout, LeaveAlternateScreen);
        }
        let _ = terminal::disable_raw_mode();
        debug!("terminal session restored");
    }
}
