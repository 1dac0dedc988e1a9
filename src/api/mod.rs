//! Backend capabilities consumed by the UI
//!
//! The controller only ever sees these two operations; the HTTP client is
//! one implementation and tests substitute their own.

pub mod http;

use crate::error::ApiResult;
use crate::types::{ItemDetail, SearchResponse};
use async_trait::async_trait;

pub use http::HttpSearchApi;

#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Ranked candidates for `query`, in the backend's relevance order
    async fn search(&self, query: &str, limit: usize) -> ApiResult<SearchResponse>;

    /// One item with its extended fields, or `ApiError::NotFound`
    async fn fetch_by_id(&self, id: &str) -> ApiResult<ItemDetail>;
}
