mod event_handler;
mod pipeline;
mod state;

pub use event_handler::handle_backend_event;
pub use state::{refresh, teardown, AppState, BackendEvent};
