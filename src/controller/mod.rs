//! Incremental-search interaction controller
//!
//! `SearchController` turns input events into state transitions plus a list
//! of [`Effect`]s for the host to carry out. It never performs I/O itself:
//! the host sends the dispatched queries, feeds responses back through
//! [`SearchController::on_search_response`] and drives the debounce timer
//! through [`SearchController::poll_debounce`].
//!
//! Two independent mechanisms keep the result list consistent:
//! the debouncer decides *when* a query is sent, and the request epoch
//! decides *whether* a response may still be applied.

pub mod debouncer;

use crate::error::ApiError;
use crate::types::Candidate;
use debouncer::SearchDebouncer;
use log::{debug, warn};
use std::time::{Duration, Instant};

/// Tag carried by every dispatched search
pub type Epoch = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// What `on_select` resolves to a candidate
#[derive(Debug, Clone, PartialEq)]
pub enum SelectTarget {
    Index(usize),
    Candidate(Candidate),
}

/// Side effects requested from the host
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send `query` to the search capability and report back with `epoch`
    Dispatch { epoch: Epoch, query: String },
    /// Bring this row into view, nearest edge
    ScrollIntoView(usize),
    /// The user picked a candidate
    Selected(Candidate),
}

/// Derived state of the suggestion panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPhase {
    /// Text empty
    Idle,
    /// Text non-empty, a search is pending or in flight
    Typing,
    /// Results available and shown
    Open,
    /// Panel hidden, results retained
    Closed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    pub text: String,
    pub request_epoch: Epoch,
}

/// Everything the controller owns, replaced field by field only inside
/// the event handlers below.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: QueryState,
    pub results: Vec<Candidate>,
    /// Highlighted row; `None` is "no highlight"
    pub cursor: Option<usize>,
    pub visible: bool,
    pub loading: bool,
}

#[derive(Debug)]
pub struct SearchController {
    state: SearchState,
    debouncer: SearchDebouncer,
    torn_down: bool,
}

impl SearchController {
    pub fn new(debounce: Duration) -> Self {
        Self {
            state: SearchState::default(),
            debouncer: SearchDebouncer::with_delay(debounce),
            torn_down: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.state.query.text
    }

    pub fn results(&self) -> &[Candidate] {
        &self.state.results
    }

    pub fn cursor(&self) -> Option<usize> {
        self.state.cursor
    }

    pub fn epoch(&self) -> Epoch {
        self.state.query.request_epoch
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Suggestion rows are drawn
    pub fn shows_suggestions(&self) -> bool {
        self.state.visible && !self.state.results.is_empty()
    }

    /// The "no results" placeholder is drawn
    pub fn shows_no_results(&self) -> bool {
        self.state.visible
            && !self.state.loading
            && !self.state.query.text.trim().is_empty()
            && self.state.results.is_empty()
    }

    pub fn phase(&self) -> PanelPhase {
        if self.state.query.text.trim().is_empty() {
            PanelPhase::Idle
        } else if !self.state.visible {
            PanelPhase::Closed
        } else if self.state.loading {
            PanelPhase::Typing
        } else {
            PanelPhase::Open
        }
    }

    /// When the host should next call `poll_debounce`
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.torn_down {
            return None;
        }
        self.debouncer.deadline()
    }

    pub fn on_text_changed(&mut self, text: impl Into<String>, now: Instant) -> Vec<Effect> {
        if self.torn_down {
            return Vec::new();
        }
        let text = text.into();
        self.state.visible = true;

        if text.trim().is_empty() {
            self.state.query.text = text;
            self.state.results.clear();
            self.state.cursor = None;
            self.state.loading = false;
            self.debouncer.clear_pending_search();
            self.supersede_in_flight();
        } else {
            self.state.query.text = text.clone();
            self.state.loading = true;
            self.debouncer.set_pending_search(text, now);
        }
        Vec::new()
    }

    /// Timer fire: dispatch the pending query once the quiet interval elapsed
    pub fn poll_debounce(&mut self, now: Instant) -> Vec<Effect> {
        if self.torn_down {
            return Vec::new();
        }
        match self.debouncer.check_ready_for_search(now) {
            Some(query) => vec![self.dispatch(query)],
            None => Vec::new(),
        }
    }

    /// Immediate search, bypassing the debounce interval
    pub fn on_submit(&mut self) -> Vec<Effect> {
        if self.torn_down || self.state.query.text.trim().is_empty() {
            return Vec::new();
        }
        self.debouncer.clear_pending_search();
        let query = self.state.query.text.clone();
        vec![self.dispatch(query)]
    }

    pub fn on_key_navigate(&mut self, direction: Direction) -> Vec<Effect> {
        let len = self.state.results.len();
        if !self.state.visible || len == 0 {
            return Vec::new();
        }
        let next = match (direction, self.state.cursor) {
            (Direction::Next, None) => Some(0),
            (Direction::Next, Some(i)) => Some((i + 1).min(len - 1)),
            (Direction::Prev, None) | (Direction::Prev, Some(0)) => None,
            (Direction::Prev, Some(i)) => Some(i - 1),
        };
        self.set_cursor(next)
    }

    pub fn on_hover(&mut self, index: usize) -> Vec<Effect> {
        if index >= self.state.results.len() {
            return Vec::new();
        }
        self.set_cursor(Some(index))
    }

    pub fn on_key_confirm(&mut self) -> Vec<Effect> {
        match self.state.cursor {
            Some(index) if index < self.state.results.len() => {
                self.on_select(SelectTarget::Index(index))
            }
            _ => Vec::new(),
        }
    }

    pub fn on_key_dismiss(&mut self) -> Vec<Effect> {
        self.state.visible = false;
        self.state.cursor = None;
        Vec::new()
    }

    pub fn on_blur_outside(&mut self) -> Vec<Effect> {
        self.on_key_dismiss()
    }

    pub fn on_focus(&mut self) -> Vec<Effect> {
        if !self.state.results.is_empty() {
            self.state.visible = true;
        }
        Vec::new()
    }

    pub fn on_select(&mut self, target: SelectTarget) -> Vec<Effect> {
        if self.torn_down {
            return Vec::new();
        }
        let candidate = match target {
            SelectTarget::Index(index) => match self.state.results.get(index) {
                Some(candidate) => candidate.clone(),
                None => return Vec::new(),
            },
            SelectTarget::Candidate(candidate) => candidate,
        };
        debug!("Selected candidate {} ({})", candidate.id, candidate.name);

        self.state.query.text = candidate.name.clone();
        self.state.results.clear();
        self.state.visible = false;
        self.state.cursor = None;
        self.state.loading = false;
        self.debouncer.clear_pending_search();
        self.supersede_in_flight();
        vec![Effect::Selected(candidate)]
    }

    /// Network completion for a dispatch. Returns whether it was applied.
    pub fn on_search_response(
        &mut self,
        epoch: Epoch,
        response: Result<Vec<Candidate>, ApiError>,
    ) -> bool {
        if self.torn_down {
            debug!("Ignoring response for epoch {} after teardown", epoch);
            return false;
        }
        if epoch != self.state.query.request_epoch {
            debug!(
                "Discarding stale response for epoch {} (current {})",
                epoch, self.state.query.request_epoch
            );
            return false;
        }

        match response {
            Ok(results) => {
                debug!("Applying {} results for epoch {}", results.len(), epoch);
                self.state.results = results;
                self.state.visible = true;
            }
            Err(err) => {
                warn!("Search failed for epoch {}: {}", epoch, err);
                self.state.results = Vec::new();
            }
        }
        self.state.cursor = None;
        // A keystroke typed after this dispatch still has a search coming
        self.state.loading = self.debouncer.has_pending_search();
        true
    }

    /// Unmount: drop the pending timer and ignore everything that arrives later
    pub fn teardown(&mut self) {
        self.debouncer.clear_pending_search();
        self.torn_down = true;
    }

    fn dispatch(&mut self, query: String) -> Effect {
        self.state.query.request_epoch += 1;
        self.state.loading = true;
        let epoch = self.state.query.request_epoch;
        debug!("Dispatching search '{}' (epoch {})", query, epoch);
        Effect::Dispatch { epoch, query }
    }

    /// Make every outstanding response stale without sending anything
    fn supersede_in_flight(&mut self) {
        self.state.query.request_epoch += 1;
    }

    fn set_cursor(&mut self, cursor: Option<usize>) -> Vec<Effect> {
        if cursor == self.state.cursor {
            return Vec::new();
        }
        self.state.cursor = cursor;
        match cursor {
            Some(index) => vec![Effect::ScrollIntoView(index)],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(300);

    fn controller() -> SearchController {
        SearchController::new(QUIET)
    }

    fn candidate(id: &str, name: &str) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: name.to_string(),
            category: "Electronics".to_string(),
            price: 1000.0,
        }
    }

    fn controller_with_results(names: &[&str]) -> SearchController {
        let start = Instant::now();
        let mut controller = SearchController::new(QUIET);
        controller.on_text_changed("q", start);
        let effects = controller.poll_debounce(start + QUIET);
        assert_eq!(effects.len(), 1);
        let results = names
            .iter()
            .enumerate()
            .map(|(i, name)| candidate(&i.to_string(), name))
            .collect();
        assert!(controller.on_search_response(controller.epoch(), Ok(results)));
        controller
    }

    #[test]
    fn test_initial_state() {
        let controller = controller();
        assert_eq!(controller.text(), "");
        assert!(controller.results().is_empty());
        assert_eq!(controller.cursor(), None);
        assert!(!controller.is_visible());
        assert!(!controller.is_loading());
        assert_eq!(controller.phase(), PanelPhase::Idle);
        assert!(controller.next_deadline().is_none());
    }

    #[test]
    fn test_text_change_schedules_without_dispatch() {
        let start = Instant::now();
        let mut controller = SearchController::new(QUIET);

        let effects = controller.on_text_changed("lap", start);
        assert!(effects.is_empty());
        assert!(controller.is_loading());
        assert!(controller.is_visible());
        assert_eq!(controller.phase(), PanelPhase::Typing);
        assert_eq!(controller.next_deadline(), Some(start + QUIET));
        assert!(controller
            .poll_debounce(start + Duration::from_millis(10))
            .is_empty());
    }

    #[test]
    fn test_dispatch_after_quiet_interval() {
        let start = Instant::now();
        let mut controller = SearchController::new(QUIET);
        controller.on_text_changed("lap", start);

        let effects = controller.poll_debounce(start + QUIET);
        assert_eq!(
            effects,
            vec![Effect::Dispatch {
                epoch: 1,
                query: "lap".to_string()
            }]
        );
        assert!(controller.poll_debounce(start + QUIET * 2).is_empty());
    }

    #[test]
    fn test_whitespace_text_clears_synchronously() {
        let mut controller = controller_with_results(&["Laptop", "Lamp"]);
        controller.on_key_navigate(Direction::Next);

        let effects = controller.on_text_changed("   ", Instant::now());
        assert!(effects.is_empty());
        assert!(controller.results().is_empty());
        assert_eq!(controller.cursor(), None);
        assert!(!controller.is_loading());
        assert!(controller.next_deadline().is_none());
        assert_eq!(controller.phase(), PanelPhase::Idle);
    }

    #[test]
    fn test_clear_discards_in_flight_response() {
        let start = Instant::now();
        let mut controller = SearchController::new(QUIET);
        controller.on_text_changed("lap", start);
        controller.poll_debounce(start + QUIET);
        let sent_epoch = controller.epoch();

        controller.on_text_changed("", start + QUIET * 2);
        assert!(!controller.on_search_response(sent_epoch, Ok(vec![candidate("1", "Laptop")])));
        assert!(controller.results().is_empty());
    }

    #[test]
    fn test_submit_dispatches_immediately() {
        let start = Instant::now();
        let mut controller = SearchController::new(QUIET);
        controller.on_text_changed("lap", start);

        let effects = controller.on_submit();
        assert_eq!(
            effects,
            vec![Effect::Dispatch {
                epoch: 1,
                query: "lap".to_string()
            }]
        );
        // The pending timer is superseded by the submit
        assert!(controller.poll_debounce(start + QUIET).is_empty());
    }

    #[test]
    fn test_submit_with_empty_text_is_noop() {
        let mut controller = controller();
        assert!(controller.on_submit().is_empty());
        controller.on_text_changed("  ", Instant::now());
        assert!(controller.on_submit().is_empty());
        assert_eq!(controller.epoch(), 1);
    }

    #[test]
    fn test_navigation_saturates() {
        let mut controller = controller_with_results(&["a", "b", "c"]);

        assert_eq!(
            controller.on_key_navigate(Direction::Next),
            vec![Effect::ScrollIntoView(0)]
        );
        controller.on_key_navigate(Direction::Next);
        controller.on_key_navigate(Direction::Next);
        assert_eq!(controller.cursor(), Some(2));
        assert!(controller.on_key_navigate(Direction::Next).is_empty());
        assert_eq!(controller.cursor(), Some(2));

        for _ in 0..5 {
            controller.on_key_navigate(Direction::Prev);
        }
        assert_eq!(controller.cursor(), None);
    }

    #[test]
    fn test_navigation_noop_when_hidden_or_empty() {
        let mut controller = controller();
        assert!(controller.on_key_navigate(Direction::Next).is_empty());
        assert_eq!(controller.cursor(), None);

        let mut controller = controller_with_results(&["a", "b"]);
        controller.on_key_dismiss();
        assert!(controller.on_key_navigate(Direction::Next).is_empty());
        assert_eq!(controller.cursor(), None);
    }

    #[test]
    fn test_hover_shares_cursor_with_keyboard() {
        let mut controller = controller_with_results(&["a", "b", "c"]);
        assert_eq!(controller.on_hover(2), vec![Effect::ScrollIntoView(2)]);
        controller.on_key_navigate(Direction::Prev);
        assert_eq!(controller.cursor(), Some(1));
        // Hovering the already highlighted row changes nothing
        assert!(controller.on_hover(1).is_empty());
        // Out of range is ignored
        assert!(controller.on_hover(7).is_empty());
        assert_eq!(controller.cursor(), Some(1));
    }

    #[test]
    fn test_dismiss_keeps_text_and_results() {
        let mut controller = controller_with_results(&["a", "b"]);
        controller.on_key_navigate(Direction::Next);
        controller.on_key_dismiss();

        assert!(!controller.is_visible());
        assert_eq!(controller.cursor(), None);
        assert_eq!(controller.text(), "q");
        assert_eq!(controller.results().len(), 2);
        assert_eq!(controller.phase(), PanelPhase::Closed);

        controller.on_focus();
        assert!(controller.is_visible());
        assert_eq!(controller.phase(), PanelPhase::Open);
    }

    #[test]
    fn test_focus_without_results_stays_hidden() {
        let mut controller = controller();
        controller.on_focus();
        assert!(!controller.is_visible());
        assert!(controller.next_deadline().is_none());
    }

    #[test]
    fn test_blur_outside_hides() {
        let mut controller = controller_with_results(&["a"]);
        controller.on_hover(0);
        controller.on_blur_outside();
        assert!(!controller.is_visible());
        assert_eq!(controller.cursor(), None);
    }

    #[test]
    fn test_confirm_requires_valid_cursor() {
        let mut controller = controller_with_results(&["Laptop"]);
        assert!(controller.on_key_confirm().is_empty());

        controller.on_key_navigate(Direction::Next);
        let effects = controller.on_key_confirm();
        assert_eq!(effects, vec![Effect::Selected(candidate("0", "Laptop"))]);
        assert_eq!(controller.text(), "Laptop");
        assert!(controller.results().is_empty());
        assert!(!controller.is_visible());
        assert_eq!(controller.cursor(), None);
    }

    #[test]
    fn test_select_by_candidate() {
        let mut controller = controller();
        let picked = candidate("9", "Monitor");
        let effects = controller.on_select(SelectTarget::Candidate(picked.clone()));
        assert_eq!(effects, vec![Effect::Selected(picked)]);
        assert_eq!(controller.text(), "Monitor");
    }

    #[test]
    fn test_select_out_of_range_index() {
        let mut controller = controller_with_results(&["a"]);
        assert!(controller.on_select(SelectTarget::Index(3)).is_empty());
        assert_eq!(controller.results().len(), 1);
    }

    #[test]
    fn test_error_response_clears_results_keeps_visibility() {
        let mut controller = controller_with_results(&["a", "b"]);
        controller.on_key_dismiss();
        let start = Instant::now();
        controller.on_text_changed("qq", start);
        controller.on_key_dismiss();
        controller.poll_debounce(start + QUIET);

        let applied = controller.on_search_response(
            controller.epoch(),
            Err(ApiError::Status {
                status: 500,
                url: "http://localhost/api/search".to_string(),
            }),
        );
        assert!(applied);
        assert!(controller.results().is_empty());
        assert!(!controller.is_loading());
        assert!(!controller.is_visible());
    }

    #[test]
    fn test_error_with_visible_panel_shows_no_results() {
        let start = Instant::now();
        let mut controller = SearchController::new(QUIET);
        controller.on_text_changed("zzz", start);
        controller.poll_debounce(start + QUIET);
        controller.on_search_response(1, Err(ApiError::NotFound("search".to_string())));
        assert!(controller.shows_no_results());
        assert!(!controller.shows_suggestions());
    }

    #[test]
    fn test_response_replaces_results_and_resets_cursor() {
        let mut controller = controller_with_results(&["a", "b"]);
        controller.on_key_navigate(Direction::Next);
        controller.on_submit();
        assert!(controller.on_search_response(
            controller.epoch(),
            Ok(vec![candidate("5", "c")])
        ));
        assert_eq!(controller.cursor(), None);
        assert_eq!(controller.results()[0].name, "c");
    }

    #[test]
    fn test_loading_kept_while_newer_keystroke_pending() {
        let start = Instant::now();
        let mut controller = SearchController::new(QUIET);
        controller.on_text_changed("x", start);
        controller.poll_debounce(start + QUIET);
        controller.on_text_changed("xy", start + QUIET + Duration::from_millis(10));

        assert!(controller.on_search_response(1, Ok(vec![candidate("1", "x1")])));
        assert!(controller.is_loading());
    }

    #[test]
    fn test_teardown_ignores_late_events() {
        let start = Instant::now();
        let mut controller = SearchController::new(QUIET);
        controller.on_text_changed("lap", start);
        controller.poll_debounce(start + QUIET);
        controller.on_text_changed("lapt", start + QUIET);
        controller.teardown();

        assert!(controller.next_deadline().is_none());
        assert!(controller.poll_debounce(start + QUIET * 3).is_empty());
        assert!(!controller.on_search_response(1, Ok(vec![candidate("1", "Laptop")])));
        assert!(controller.results().is_empty());
        assert!(controller.is_torn_down());
    }
}
