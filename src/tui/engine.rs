//! TUI engine: terminal lifecycle and the event loop
//!
//! - Keyboard and mouse input arrive over a channel fed by a blocking reader
//! - Search and lookup completions arrive over a second channel
//! - The debounce deadline and the animation interval are the only timers
//!
//! Every handler runs to completion on the loop before the next event is
//! taken, so `App` needs no locking.

use super::renderer::TuiRenderer;
use super::tasks::{spawn_command, Completion};
use crate::api::SearchApi;
use crate::app::{App, Command};
use crate::config::Config;

use anyhow::{anyhow, Context, Result};
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyEvent, MouseEvent,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::Stdout;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::Interval;

/// How long the input reader blocks before checking for shutdown
const INPUT_POLL: Duration = Duration::from_millis(50);
/// Frame interval while something is animating
const ANIMATION_FRAME: Duration = Duration::from_millis(60);

/// User input event
#[derive(Debug)]
pub enum InputEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
}

/// Read terminal events on the blocking pool until `stop` is set or the
/// receiver is gone.
fn spawn_input_reader(tx: mpsc::UnboundedSender<InputEvent>, stop: Arc<AtomicBool>) {
    tokio::task::spawn_blocking(move || {
        while !stop.load(Ordering::Relaxed) {
            match crossterm::event::poll(INPUT_POLL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    log::error!("Input poll failed: {}", e);
                    break;
                }
            }
            let event = match crossterm::event::read() {
                Ok(CrosstermEvent::Key(key)) => InputEvent::Key(key),
                Ok(CrosstermEvent::Mouse(mouse)) => InputEvent::Mouse(mouse),
                Ok(CrosstermEvent::Resize(w, h)) => InputEvent::Resize(w, h),
                Ok(_) => continue,
                Err(e) => {
                    log::error!("Input read failed: {}", e);
                    break;
                }
            };
            if tx.send(event).is_err() {
                break;
            }
        }
    });
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

/// What woke the event loop
#[derive(Debug)]
enum LoopEvent {
    Input(InputEvent),
    Completion(Completion),
    Deadline,
    Frame,
}

/// Wait for the next thing the loop has to handle.
///
/// Fails once the input reader is gone: nothing could ever quit the loop
/// after that, so the caller has to restore the terminal.
async fn next_event(
    input_rx: &mut mpsc::UnboundedReceiver<InputEvent>,
    completion_rx: &mut mpsc::UnboundedReceiver<Completion>,
    deadline: Option<Instant>,
    animation: &mut Interval,
    animating: bool,
) -> Result<LoopEvent> {
    tokio::select! {
        biased;

        // 入力処理を最優先
        input = input_rx.recv() => match input {
            Some(input) => Ok(LoopEvent::Input(input)),
            None => Err(anyhow!("Terminal input reader stopped")),
        },

        Some(completion) = completion_rx.recv() => Ok(LoopEvent::Completion(completion)),

        _ = sleep_until_deadline(deadline) => Ok(LoopEvent::Deadline),

        _ = animation.tick(), if animating => Ok(LoopEvent::Frame),
    }
}

/// Run `undo` when `result` is an error, keeping the original error
fn undo_on_error<T>(result: Result<T>, undo: impl FnOnce() -> std::io::Result<()>) -> Result<T> {
    if result.is_err() {
        if let Err(e) = undo() {
            log::error!("Failed to restore terminal: {}", e);
        }
    }
    result
}

/// メッセージ処理エンジン
pub struct TuiEngine {
    app: App,
    api: Arc<dyn SearchApi>,
    terminal: Terminal<CrosstermBackend<Stdout>>,
    input_rx: mpsc::UnboundedReceiver<InputEvent>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    input_stop: Arc<AtomicBool>,
    frame_count: usize,
}

impl TuiEngine {
    /// Take over the terminal and start reading input
    pub fn new(config: Config, api: Arc<dyn SearchApi>) -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let terminal = undo_on_error(Self::enter_screen(), disable_raw_mode)?;

        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let input_stop = Arc::new(AtomicBool::new(false));
        spawn_input_reader(input_tx, input_stop.clone());

        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        Ok(Self {
            app: App::new(config),
            api,
            terminal,
            input_rx,
            completion_tx,
            completion_rx,
            input_stop,
            frame_count: 0,
        })
    }

    fn enter_screen() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        Ok(Terminal::new(CrosstermBackend::new(stdout))?)
    }

    /// メインイベントループ
    pub async fn run(&mut self, initial_query: Option<String>, item: Option<String>) -> Result<()> {
        let now = Instant::now();
        let commands = match (item, initial_query) {
            (Some(id), _) => self.app.open_detail(&id),
            (None, Some(query)) => self.app.start_with_query(&query, now),
            (None, None) => Vec::new(),
        };
        self.execute(commands);
        self.render()?;

        let mut animation = tokio::time::interval(ANIMATION_FRAME);
        animation.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        while !self.app.should_quit() {
            let deadline = self.app.next_deadline();
            let animating = self.app.is_animating();

            let event = next_event(
                &mut self.input_rx,
                &mut self.completion_rx,
                deadline,
                &mut animation,
                animating,
            )
            .await?;

            let commands = match event {
                LoopEvent::Input(input) => self.handle_input(input),
                LoopEvent::Completion(completion) => {
                    self.handle_completion(completion);
                    Vec::new()
                }
                LoopEvent::Deadline => self.app.on_tick(Instant::now()),
                LoopEvent::Frame => {
                    self.frame_count = self.frame_count.wrapping_add(1);
                    self.app.on_tick(Instant::now())
                }
            };

            self.execute(commands);
            if self.app.should_quit() {
                break;
            }
            self.render()?;
        }

        Ok(())
    }

    fn handle_input(&mut self, input: InputEvent) -> Vec<Command> {
        match input {
            InputEvent::Key(key) => self.app.handle_key(key, Instant::now()),
            InputEvent::Mouse(mouse) => self.app.handle_mouse(mouse),
            InputEvent::Resize(w, h) => {
                log::debug!("Terminal resized to {}x{}", w, h);
                Vec::new()
            }
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Search { epoch, result } => {
                self.app.on_search_completion(epoch, result, Instant::now())
            }
            Completion::Lookup { id, result } => self.app.on_lookup_completion(&id, result),
        }
    }

    fn execute(&mut self, commands: Vec<Command>) {
        let limit = self.app.config.result_limit;
        for command in commands {
            log::debug!("Executing {:?}", command);
            if command == Command::Quit {
                continue;
            }
            spawn_command(self.api.clone(), command, limit, self.completion_tx.clone());
        }
    }

    fn render(&mut self) -> Result<()> {
        let app = &self.app;
        let frame_count = self.frame_count;
        let mut layout = None;
        self.terminal.draw(|f| {
            layout = Some(TuiRenderer::render(f, app, frame_count));
        })?;
        if let Some(layout) = layout {
            self.app.apply_layout(layout);
        }
        Ok(())
    }

    /// Unmount the app and give the terminal back
    pub fn cleanup(&mut self) -> Result<()> {
        self.app.shutdown();
        self.input_stop.store(true, Ordering::Relaxed);
        self.completion_rx.close();

        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

/// Run the interactive UI until the user quits
pub async fn run_tui(
    config: Config,
    api: Arc<dyn SearchApi>,
    initial_query: Option<String>,
    item: Option<String>,
) -> Result<()> {
    let mut engine = TuiEngine::new(config, api)?;
    let result = engine.run(initial_query, item).await;
    let cleanup = engine.cleanup();
    result.and(cleanup)
}
