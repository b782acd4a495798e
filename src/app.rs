//! Application: the main event loop tying stream, view and terminal
//! together.
//!
//! All application state lives here, on the main thread. Input events,
//! connection events and the frame tick are multiplexed with
//! `crossbeam_channel::select!`.

use crate::actor::{CloseReason, ConnectionEvent, Engine, InputEvent, KeyCode};
use crate::config::Config;
use crate::error::Result;
use crate::screen::{Frame, Rect};
use crate::stream::{BufferChanged, Connector, StreamController, WsConnector};
use crate::widget::{LogView, ProgressBar, RenderedRows, StatusBar, Widget};
use crossbeam_channel::{select, tick, Receiver};
use tracing::{info, warn};

/// Title shown until some progress has been made.
const IDLE_TITLE: &str = "logview";

/// Viewer state: the stream, the log view and its chrome.
pub struct App {
    stream: StreamController,
    view: LogView,
    status: StatusBar,
    progress: ProgressBar,
    changes: Receiver<BufferChanged>,
    running: bool,
}

impl App {
    /// Build the viewer laid out over `area`. Nothing is connected yet.
    pub fn new(config: &Config, area: Rect) -> Self {
        let mut stream = StreamController::new(config.stream());
        let changes = stream.subscribe();
        let mut app = Self {
            status: StatusBar::new(Rect::ZERO, config.url.clone()),
            progress: ProgressBar::with_config(Rect::ZERO, config.progress()),
            view: LogView::with_config(Rect::ZERO, config.view()),
            stream,
            changes,
            running: true,
        };
        app.layout(area);
        app
    }

    /// Status bar on the first row, progress bar on the second, the log
    /// below.
    pub fn layout(&mut self, area: Rect) {
        let (status, rest) = area.split_top(1);
        let (progress, log) = rest.split_top(1);
        self.status.set_bounds(status);
        self.progress.set_bounds(progress);
        self.view.set_bounds(log);
    }

    /// Open the stream through `connector`.
    pub fn connect<C: Connector>(&mut self, connector: C) {
        self.stream.connect(connector);
    }

    /// The stream controller.
    pub const fn stream(&self) -> &StreamController {
        &self.stream
    }

    /// The log view.
    pub const fn view(&self) -> &LogView {
        &self.view
    }

    /// Whether the loop should keep going.
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// React to one input event.
    pub fn handle_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Key { code, modifiers } => {
                let quit = matches!(code, KeyCode::Char('q') | KeyCode::Esc)
                    || (modifiers.control && *code == KeyCode::Char('c'));
                if quit {
                    info!("quit requested");
                    self.running = false;
                    return;
                }
                self.view.handle_input(event);
            }
            InputEvent::MouseScroll { .. } => {
                self.view.handle_input(event);
            }
            InputEvent::Error(e) => warn!(error = %e, "input error"),
            // Resizes need the engine and are handled by the loop.
            InputEvent::Resize { .. } | InputEvent::Shutdown => {}
        }
    }

    /// Apply one connection event.
    pub fn handle_connection(&mut self, event: ConnectionEvent) {
        self.stream.handle_event(event);
    }

    /// Feed buffer notifications to the view and refresh the chrome.
    pub fn sync(&mut self) {
        let mut latest = None;
        while let Ok(change) = self.changes.try_recv() {
            latest = Some(change);
        }
        if let Some(change) = latest {
            self.view.buffer_changed(change.len);
        }

        self.status
            .set_status(self.stream.state(), self.stream.log().len(), self.view.auto_scroll());
        self.progress.set_percent(self.stream.progress_percent());
    }

    /// Whether anything on screen is out of date.
    pub fn needs_redraw(&self) -> bool {
        self.view.needs_redraw() || self.status.needs_redraw() || self.progress.needs_redraw()
    }

    /// Draw everything into `frame` and issue any load request the view
    /// made.
    pub fn draw(&mut self, frame: &mut Frame) -> RenderedRows {
        self.status.render(frame);
        self.progress.render(frame);
        let rendered = self.view.render(frame, self.stream.log());

        if let Some(range) = rendered.load.clone() {
            self.view.load_more_rows(range, &mut self.stream);
        }

        self.status.clear_redraw();
        self.progress.clear_redraw();
        self.view.clear_redraw();
        rendered
    }

    /// Terminal window title.
    pub fn title(&self) -> String {
        let percent = self.stream.progress_percent();
        if percent > 0.0 {
            format!("{percent}%")
        } else {
            IDLE_TITLE.to_string()
        }
    }

    /// Close the stream.
    pub fn shutdown(&mut self) {
        self.stream.disconnect();
    }
}

/// Run the viewer until the user quits.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up.
pub fn run(config: &Config) -> Result<()> {
    let mut engine = Engine::with_config(config.engine())?;
    let mut app = App::new(config, engine.area());
    app.connect(WsConnector::new(config.poll_interval()));

    let input = engine.input_receiver().clone();
    let ticker = tick(engine.config().frame_interval());
    let mut full_redraw = true;

    while app.is_running() {
        let connection = app.stream().events();
        select! {
            recv(input) -> msg => match msg {
                Ok(InputEvent::Resize { width, height }) => {
                    engine.handle_resize(width, height);
                    app.layout(engine.area());
                    full_redraw = true;
                }
                Ok(event) => app.handle_input(&event),
                Err(_) => break,
            },
            recv(connection) -> msg => {
                let event = msg.unwrap_or_else(|_| {
                    ConnectionEvent::Closed(CloseReason::UnexpectedClose("connection thread exited".into()))
                });
                app.handle_connection(event);
            },
            recv(ticker) -> _ => {
                app.sync();
                if full_redraw || app.needs_redraw() {
                    app.draw(engine.frame_mut());
                    if full_redraw {
                        engine.present_full();
                        full_redraw = false;
                    } else {
                        engine.present();
                    }
                    let title = app.title();
                    engine.set_title(&title);
                }
            },
        }
    }

    app.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::KeyModifiers;
    use crate::stream::testing::ChannelConnector;
    use crate::stream::ConnectionState;
    use std::time::{Duration, Instant};

    const WAIT: Duration = Duration::from_secs(2);

    fn config() -> Config {
        Config {
            url: "ws://test/logs".into(),
            expected_total_bytes: 300,
            ..Config::default()
        }
    }

    fn pump_until(app: &mut App, done: impl Fn(&App) -> bool) {
        let deadline = Instant::now() + WAIT;
        while !done(app) {
            assert!(Instant::now() < deadline, "timed out");
            let events = app.stream().events();
            if let Ok(event) = events.recv_timeout(Duration::from_millis(20)) {
                app.handle_connection(event);
            }
        }
        app.sync();
    }

    #[test]
    fn test_layout() {
        let app = App::new(&config(), Rect::from_size(40, 10));
        assert_eq!(app.status.bounds(), Rect::new(0, 0, 40, 1));
        assert_eq!(app.progress.bounds(), Rect::new(0, 1, 40, 1));
        assert_eq!(app.view().bounds(), Rect::new(0, 2, 40, 8));
    }

    #[test]
    fn test_quit_keys() {
        for event in [
            InputEvent::key(KeyCode::Char('q')),
            InputEvent::key(KeyCode::Esc),
            InputEvent::Key {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers {
                    control: true,
                    ..KeyModifiers::NONE
                },
            },
        ] {
            let mut app = App::new(&config(), Rect::from_size(40, 10));
            app.handle_input(&event);
            assert!(!app.is_running());
        }
    }

    #[test]
    fn test_toggle_key_reaches_view() {
        let mut app = App::new(&config(), Rect::from_size(40, 10));
        app.handle_input(&InputEvent::key(KeyCode::Char('a')));
        assert!(app.is_running());
        assert!(!app.view().auto_scroll());
    }

    #[test]
    fn test_stream_to_screen() {
        let (connector, remote) = ChannelConnector::new();
        let mut app = App::new(&config(), Rect::from_size(80, 6));
        let mut frame = Frame::new(80, 6);
        app.connect(connector);

        pump_until(&mut app, |a| a.stream().state() == ConnectionState::Open);
        assert_eq!(remote.outbound.recv_timeout(WAIT).unwrap(), "Hello Server!");

        // The empty view asks for its placeholder row.
        app.draw(&mut frame);
        assert_eq!(remote.outbound.recv_timeout(WAIT).unwrap(), "next");

        for line in ["a", "b", "c"] {
            remote.inbound.send(Some(line.to_string())).unwrap();
        }
        pump_until(&mut app, |a| a.stream().log().len() == 3);
        let rendered = app.draw(&mut frame);

        assert_eq!(app.view().row_count(), 4);
        assert_eq!(app.view().scroll_target(), Some(2));
        assert_eq!(rendered.visible, 0..4);
        assert_eq!(frame.row_text(2).trim_end(), "a");
        assert_eq!(frame.row_text(4).trim_end(), "c");
        assert!(frame.row_text(0).contains("3 lines"));
        assert!(frame.row_text(1).trim_end().ends_with("1.00%"));
        assert_eq!(app.title(), "1%");
        assert_eq!(remote.outbound.recv_timeout(WAIT).unwrap(), "next");

        app.shutdown();
        assert_eq!(app.stream().state(), ConnectionState::Closed);
    }

    #[test]
    fn test_idle_title() {
        let app = App::new(&config(), Rect::from_size(40, 10));
        assert_eq!(app.title(), IDLE_TITLE);
    }
}
