/// Result type for backend operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Failures of the search and lookup capabilities.
///
/// Everything except `NotFound` is a transport failure: the UI degrades to
/// an empty result list or the not-found screen and never retries on its own.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Item not found: {0}")]
    NotFound(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}
