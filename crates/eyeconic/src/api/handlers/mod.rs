//! HTTP handlers, split by resource.

pub mod chat;
pub mod history;
pub mod misc;

pub use chat::{ChatResponse, ChatSubmission, chat};
pub use history::{ExchangeResponse, list_history};
pub use misc::{HealthResponse, health};
