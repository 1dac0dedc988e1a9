//! Terminal front end
//!
//! Everything here is presentation or I/O plumbing around
//! [`crate::app::App`]; the interaction logic lives in the controller.

pub mod engine;
pub mod input;
pub mod renderer;
pub mod tasks;
pub mod toast;
pub mod viewport;

pub use engine::{run_tui, TuiEngine};
pub use input::{InputHandler, InputOperation, LineEditor};
pub use renderer::TuiRenderer;
pub use toast::{ToastState, ToastType};
pub use viewport::SuggestionViewport;
