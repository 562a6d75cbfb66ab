//! HTTP API module.
//!
//! Chat relay, history listing, media files and health.

mod error;
pub mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::create_router_with_config;
pub use state::AppState;
