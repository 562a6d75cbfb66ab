//! Inference client module.
//!
//! Forwards a prompt (and optionally one image) to a hosted chat-completion API.

mod client;
mod error;
mod types;

use async_trait::async_trait;

pub use client::InferenceClient;
pub use error::{InferenceError, InferenceResult};
pub use types::*;

/// Minimal inference abstraction so the chat service can be tested without a provider.
#[async_trait]
pub trait InferenceApi: Send + Sync {
    /// Return the model's reply to `input`.
    async fn complete(&self, input: &CompletionInput) -> InferenceResult<String>;
}

#[async_trait]
impl InferenceApi for InferenceClient {
    async fn complete(&self, input: &CompletionInput) -> InferenceResult<String> {
        self.complete(input).await
    }
}
