//! Application state shared across handlers.

use std::sync::Arc;

use crate::chat::ChatService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Chat relay and history access.
    pub chat: Arc<ChatService>,
}

impl AppState {
    pub fn new(chat: ChatService) -> Self {
        Self {
            chat: Arc::new(chat),
        }
    }
}
