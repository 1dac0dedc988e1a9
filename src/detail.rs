//! Item detail screen state
//!
//! Mounted with a route id, it asks for exactly one lookup and settles into
//! one of three outcomes. No caching, no retry.

use crate::error::ApiError;
use crate::types::ItemDetail;
use log::{debug, warn};

pub const NOT_FOUND_TITLE: &str = "Item Not Found";
pub const NOT_FOUND_MESSAGE: &str = "The item you are looking for does not exist.";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load item details";

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    Loaded(ItemDetail),
    /// The backend has no record with this id
    NotFound,
    /// Transport failure; rendered like `NotFound` with a different message
    Failed,
}

#[derive(Debug, Clone)]
pub struct DetailView {
    id: String,
    state: DetailState,
}

impl DetailView {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: DetailState::Loading,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, DetailState::Loading)
    }

    pub fn item(&self) -> Option<&ItemDetail> {
        match &self.state {
            DetailState::Loaded(item) => Some(item),
            _ => None,
        }
    }

    /// Message under the not-found title, if the lookup failed
    pub fn failure_message(&self) -> Option<&'static str> {
        match self.state {
            DetailState::NotFound => Some(NOT_FOUND_MESSAGE),
            DetailState::Failed => Some(LOAD_FAILED_MESSAGE),
            _ => None,
        }
    }

    /// Apply a lookup completion. Completions for another id are ignored.
    pub fn on_lookup_response(&mut self, id: &str, result: Result<ItemDetail, ApiError>) -> bool {
        if id != self.id {
            debug!("Ignoring lookup for {} while showing {}", id, self.id);
            return false;
        }
        self.state = match result {
            Ok(item) => DetailState::Loaded(item),
            Err(err) if err.is_not_found() => DetailState::NotFound,
            Err(err) => {
                warn!("Error fetching item {}: {}", id, err);
                DetailState::Failed
            }
        };
        true
    }
}
