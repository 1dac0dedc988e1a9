//! Toast notification system
//!
//! Short-lived notices drawn in the top-right corner, used to surface
//! backend failures without leaving the current screen.

use std::time::{Duration, Instant};

/// Toast notification state and content
#[derive(Clone, Debug)]
pub struct ToastState {
    pub visible: bool,
    pub message: String,
    pub toast_type: ToastType,
    pub show_until: Option<Instant>,
}

/// Type of toast notification
#[derive(Clone, Debug, PartialEq)]
pub enum ToastType {
    Info,
    Warning,
    Error,
}

impl Default for ToastState {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastState {
    /// Create a new hidden toast
    pub fn new() -> Self {
        Self {
            visible: false,
            message: String::new(),
            toast_type: ToastType::Info,
            show_until: None,
        }
    }

    /// Show a toast from `now` for `duration`
    pub fn show(&mut self, message: String, toast_type: ToastType, duration: Duration, now: Instant) {
        self.visible = true;
        self.message = message;
        self.toast_type = toast_type;
        self.show_until = Some(now + duration);
    }

    /// Hide if expired at `now`. Returns whether visibility changed.
    pub fn update(&mut self, now: Instant) -> bool {
        match self.show_until {
            Some(until) if now >= until => {
                self.hide();
                true
            }
            _ => false,
        }
    }

    /// Hide the toast
    pub fn hide(&mut self) {
        self.visible = false;
        self.show_until = None;
    }
}
