//! Runtime configuration, fixed at process start

use crate::format::{Locale, PriceFormat};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5001/api";
pub const DEFAULT_RESULT_LIMIT: usize = 10;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base address of the search/lookup backend, without trailing slash
    pub api_base_url: String,
    /// `limit` sent with every search
    pub result_limit: usize,
    /// Quiet interval before a typed query is dispatched
    pub debounce: Duration,
    pub request_timeout: Duration,
    pub price_format: PriceFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            result_limit: DEFAULT_RESULT_LIMIT,
            debounce: DEFAULT_DEBOUNCE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            price_format: PriceFormat::default(),
        }
    }
}

impl Config {
    pub fn with_api_base_url(mut self, url: &str) -> Self {
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn locale(&self) -> Locale {
        self.price_format.locale
    }
}
