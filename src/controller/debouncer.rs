//! Search debounce control
//!
//! Holds at most one pending query. Every new input restarts the quiet
//! interval; the query becomes ready only once the interval has elapsed
//! without further input. The clock is passed in by the caller so the
//! timer can be driven deterministically.

use std::time::{Duration, Instant};

/// Search debounce controller for rate-limiting search requests
#[derive(Debug)]
pub struct SearchDebouncer {
    /// Quiet interval
    pub debounce_delay: Duration,

    /// Pending search query to execute after debounce delay
    pending_search_query: Option<String>,

    /// Last input time for debounce calculation
    last_input_time: Option<Instant>,
}

impl SearchDebouncer {
    /// Create new search debouncer with custom delay
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            debounce_delay: delay,
            pending_search_query: None,
            last_input_time: None,
        }
    }

    /// Replace the pending query and restart the quiet interval
    pub fn set_pending_search(&mut self, query: String, now: Instant) {
        self.pending_search_query = Some(query);
        self.last_input_time = Some(now);
    }

    /// Abandon the pending query, if any
    pub fn clear_pending_search(&mut self) {
        self.pending_search_query = None;
        self.last_input_time = None;
    }

    /// Take the pending query if the quiet interval has elapsed at `now`
    pub fn check_ready_for_search(&mut self, now: Instant) -> Option<String> {
        let deadline = self.deadline()?;
        if now >= deadline {
            let ready_query = self.pending_search_query.take();
            self.last_input_time = None;
            return ready_query;
        }
        None
    }

    pub fn has_pending_search(&self) -> bool {
        self.pending_search_query.is_some() && self.last_input_time.is_some()
    }

    /// Instant at which the pending query becomes ready
    pub fn deadline(&self) -> Option<Instant> {
        match (&self.pending_search_query, self.last_input_time) {
            (Some(_), Some(last_time)) => Some(last_time + self.debounce_delay),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn test_search_debouncer_creation() {
        let debouncer = SearchDebouncer::with_delay(DELAY);
        assert_eq!(debouncer.debounce_delay, DELAY);
        assert!(!debouncer.has_pending_search());
        assert!(debouncer.deadline().is_none());
    }

    #[test]
    fn test_not_ready_before_quiet_interval() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::with_delay(DELAY);
        debouncer.set_pending_search("lap".to_string(), start);

        assert!(debouncer
            .check_ready_for_search(start + Duration::from_millis(299))
            .is_none());
        assert!(debouncer.has_pending_search());
    }

    #[test]
    fn test_ready_after_quiet_interval() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::with_delay(DELAY);
        debouncer.set_pending_search("lap".to_string(), start);

        let result = debouncer.check_ready_for_search(start + DELAY);
        assert_eq!(result, Some("lap".to_string()));

        // Should be cleared after retrieval
        assert!(!debouncer.has_pending_search());
        assert!(debouncer.check_ready_for_search(start + DELAY * 2).is_none());
    }

    #[test]
    fn test_new_input_restarts_timer() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::with_delay(DELAY);
        debouncer.set_pending_search("a".to_string(), start);
        debouncer.set_pending_search("ab".to_string(), start + Duration::from_millis(200));

        // The first deadline has passed but the restarted one has not
        assert!(debouncer
            .check_ready_for_search(start + Duration::from_millis(350))
            .is_none());
        assert_eq!(
            debouncer.check_ready_for_search(start + Duration::from_millis(500)),
            Some("ab".to_string())
        );
    }

    #[test]
    fn test_clear_pending_search() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::with_delay(DELAY);
        debouncer.set_pending_search("test".to_string(), start);
        debouncer.clear_pending_search();

        assert!(!debouncer.has_pending_search());
        assert!(debouncer.check_ready_for_search(start + DELAY).is_none());
    }

    #[test]
    fn test_deadline_follows_last_input() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::with_delay(DELAY);
        debouncer.set_pending_search("test".to_string(), start);
        assert_eq!(debouncer.deadline(), Some(start + DELAY));

        let later = start + Duration::from_millis(100);
        debouncer.set_pending_search("tests".to_string(), later);
        assert_eq!(debouncer.deadline(), Some(later + DELAY));
    }
}
