mod event_handler;
mod exercise;
mod narration;
mod state;

pub use event_handler::handle_app_event;
pub use exercise::stop_breathing;
pub use state::{AppEvent, AppState};
