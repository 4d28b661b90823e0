//! llmhub HTTP surface: shared state and route handlers.

pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
