//! Application shell: routes, key/mouse mapping and side-effect commands
//!
//! `App` owns the search controller and the detail view and translates
//! terminal events into controller events. Everything that needs I/O is
//! returned as a [`Command`] for the engine to run, so the whole shell can
//! be driven from tests without a terminal.

use crate::config::Config;
use crate::controller::{Direction, Effect, Epoch, SearchController, SelectTarget};
use crate::detail::DetailView;
use crate::error::ApiError;
use crate::tui::input::{InputOperation, LineEditor};
use crate::tui::toast::{ToastState, ToastType};
use crate::tui::viewport::SuggestionViewport;
use crate::types::{Candidate, ItemDetail};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use log::debug;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};

const ERROR_TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Search entry point
    Search,
    /// Detail view keyed by item id
    Detail(String),
}

/// I/O requested by the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search { epoch: Epoch, query: String },
    Lookup { id: String },
    Quit,
}

/// Screen areas from the last frame, used to resolve mouse events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HitRegions {
    pub input: Option<Rect>,
    pub panel: Option<Rect>,
    /// Result index and the row it occupies
    pub rows: Vec<(usize, Rect)>,
    pub back_button: Option<Rect>,
}

impl HitRegions {
    fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        self.rows
            .iter()
            .find(|(_, rect)| contains(rect, column, row))
            .map(|(index, _)| *index)
    }
}

/// What the renderer measured while drawing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameLayout {
    pub hit: HitRegions,
    /// Suggestion rows that fit in the panel
    pub panel_rows: usize,
}

pub fn contains(rect: &Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

pub struct App {
    pub config: Config,
    route: Route,
    controller: SearchController,
    editor: LineEditor,
    viewport: SuggestionViewport,
    detail: Option<DetailView>,
    pub toast: ToastState,
    pub show_help: bool,
    /// Candidate most recently picked, shown while its details load
    last_selection: Option<Candidate>,
    hit: HitRegions,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        let controller = SearchController::new(config.debounce);
        Self {
            config,
            route: Route::Search,
            controller,
            editor: LineEditor::new(),
            viewport: SuggestionViewport::new(),
            detail: None,
            toast: ToastState::new(),
            show_help: false,
            last_selection: None,
            hit: HitRegions::default(),
            should_quit: false,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn controller(&self) -> &SearchController {
        &self.controller
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    pub fn viewport(&self) -> &SuggestionViewport {
        &self.viewport
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    pub fn last_selection(&self) -> Option<&Candidate> {
        self.last_selection.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// When the engine must wake up for the debounce timer
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.route {
            Route::Search => self.controller.next_deadline(),
            Route::Detail(_) => None,
        }
    }

    /// Frames are still changing without input
    pub fn is_animating(&self) -> bool {
        !self.viewport.is_settled() || self.toast.visible || self.controller.is_loading()
    }

    /// Unmount everything before the terminal is released
    pub fn shutdown(&mut self) {
        self.controller.teardown();
        self.should_quit = true;
    }

    /// Type `text` into a freshly mounted search screen
    pub fn start_with_query(&mut self, text: &str, now: Instant) -> Vec<Command> {
        self.editor.move_to_end(text);
        let effects = self.controller.on_text_changed(text, now);
        self.apply_effects(effects)
    }

    /// Deep link straight to the detail route
    pub fn open_detail(&mut self, id: &str) -> Vec<Command> {
        debug!("Navigating to item {}", id);
        self.controller.teardown();
        self.route = Route::Detail(id.to_string());
        self.detail = Some(DetailView::new(id));
        self.show_help = false;
        vec![Command::Lookup { id: id.to_string() }]
    }

    /// Navigate back to a fresh search screen
    pub fn back_to_search(&mut self) {
        debug!("Navigating back to search");
        self.controller.teardown();
        self.controller = SearchController::new(self.config.debounce);
        self.editor = LineEditor::new();
        self.viewport = SuggestionViewport::new();
        self.detail = None;
        self.route = Route::Search;
    }

    /// Store what the renderer measured
    pub fn apply_layout(&mut self, layout: FrameLayout) {
        self.viewport
            .set_height(layout.panel_rows, self.controller.results().len());
        self.hit = layout.hit;
    }

    /// Timer wake-up: debounce, toast expiry, scroll easing
    pub fn on_tick(&mut self, now: Instant) -> Vec<Command> {
        self.toast.update(now);
        self.viewport.step();
        if self.route != Route::Search {
            return Vec::new();
        }
        let effects = self.controller.poll_debounce(now);
        self.apply_effects(effects)
    }

    pub fn on_search_completion(
        &mut self,
        epoch: Epoch,
        result: Result<Vec<Candidate>, ApiError>,
        now: Instant,
    ) {
        let failure = result.as_ref().err().map(|err| err.to_string());
        if self.controller.on_search_response(epoch, result) {
            self.viewport.reset();
            if let Some(message) = failure {
                self.toast.show(
                    format!("Search failed: {}", message),
                    ToastType::Warning,
                    ERROR_TOAST_DURATION,
                    now,
                );
            }
        }
    }

    pub fn on_lookup_completion(&mut self, id: &str, result: Result<ItemDetail, ApiError>) {
        match (&self.route, self.detail.as_mut()) {
            (Route::Detail(current), Some(detail)) if current == id => {
                detail.on_lookup_response(id, result);
            }
            _ => debug!("Ignoring lookup for {} after navigation", id),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Vec<Command> {
        if key.kind == KeyEventKind::Release {
            return Vec::new();
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return vec![Command::Quit];
        }
        if key.code == KeyCode::F(1) {
            self.show_help = !self.show_help;
            return Vec::new();
        }
        if self.show_help && key.code == KeyCode::Esc {
            self.show_help = false;
            return Vec::new();
        }

        match self.route {
            Route::Search => self.handle_search_key(key, now),
            Route::Detail(_) => {
                match key.code {
                    KeyCode::Esc | KeyCode::Backspace | KeyCode::Enter | KeyCode::Char('b') => {
                        self.back_to_search()
                    }
                    _ => {}
                }
                Vec::new()
            }
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent, now: Instant) -> Vec<Command> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if !self.controller.shows_suggestions() {
            match key.code {
                KeyCode::Enter => {
                    let effects = self.controller.on_submit();
                    return self.apply_effects(effects);
                }
                // No focus gesture on a terminal: Down reopens retained results
                KeyCode::Down => {
                    let effects = self.controller.on_focus();
                    return self.apply_effects(effects);
                }
                _ => return self.edit_query(&key, now),
            }
        }

        let effects = match key.code {
            KeyCode::Down => self.controller.on_key_navigate(Direction::Next),
            KeyCode::Char('n') if ctrl => self.controller.on_key_navigate(Direction::Next),
            KeyCode::Up => self.controller.on_key_navigate(Direction::Prev),
            KeyCode::Char('p') if ctrl => self.controller.on_key_navigate(Direction::Prev),
            KeyCode::Enter => self.controller.on_key_confirm(),
            KeyCode::Esc => self.controller.on_key_dismiss(),
            _ => return self.edit_query(&key, now),
        };
        self.apply_effects(effects)
    }

    fn edit_query(&mut self, key: &KeyEvent, now: Instant) -> Vec<Command> {
        let Some(operation) = InputOperation::from_key(key) else {
            return Vec::new();
        };
        let edits = operation.edits_text();
        let text = self.editor.apply(operation, self.controller.text());
        if !edits || text == self.controller.text() {
            return Vec::new();
        }
        let effects = self.controller.on_text_changed(text, now);
        self.apply_effects(effects)
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Vec<Command> {
        let (column, row) = (mouse.column, mouse.row);
        match self.route {
            Route::Search => match mouse.kind {
                MouseEventKind::Moved => match self.hit.row_at(column, row) {
                    Some(index) => {
                        let effects = self.controller.on_hover(index);
                        self.apply_effects(effects)
                    }
                    None => Vec::new(),
                },
                MouseEventKind::Down(MouseButton::Left) => {
                    let effects = if let Some(index) = self.hit.row_at(column, row) {
                        self.controller.on_select(SelectTarget::Index(index))
                    } else if self.hit.input.is_some_and(|r| contains(&r, column, row)) {
                        self.controller.on_focus()
                    } else if self.hit.panel.is_some_and(|r| contains(&r, column, row)) {
                        Vec::new()
                    } else {
                        self.controller.on_blur_outside()
                    };
                    self.apply_effects(effects)
                }
                _ => Vec::new(),
            },
            Route::Detail(_) => {
                if mouse.kind == MouseEventKind::Down(MouseButton::Left)
                    && self.hit.back_button.is_some_and(|r| contains(&r, column, row))
                {
                    self.back_to_search();
                }
                Vec::new()
            }
        }
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) -> Vec<Command> {
        let mut commands = Vec::new();
        for effect in effects {
            match effect {
                Effect::Dispatch { epoch, query } => {
                    commands.push(Command::Search { epoch, query });
                }
                Effect::ScrollIntoView(index) => self.viewport.scroll_into_view(index),
                Effect::Selected(candidate) => {
                    let id = candidate.id.clone();
                    self.last_selection = Some(candidate);
                    commands.extend(self.open_detail(&id));
                }
            }
        }
        commands
    }
}
