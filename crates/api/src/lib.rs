pub mod auth_handlers;
pub mod error;
pub mod middleware;
pub mod router;
pub mod state;
pub mod user_handlers;

pub use error::ApiError;
pub use state::AppState;
