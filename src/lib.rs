pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod controller;
pub mod detail;
pub mod error;
pub mod format;
pub mod tui;
pub mod types;

// 公開API
pub use api::{HttpSearchApi, SearchApi};
pub use app::{App, Command, Route};
pub use config::Config;
pub use controller::{Direction, Effect, Epoch, PanelPhase, SearchController, SelectTarget};
pub use detail::{DetailState, DetailView};
pub use error::{ApiError, ApiResult};
pub use types::{Candidate, ItemDetail, SearchResponse};
