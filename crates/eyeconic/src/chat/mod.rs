//! Chat service: validate, ask the model, record the exchange.

mod service;

pub use service::{ChatError, ChatRequest, ChatService, ImageUpload};
