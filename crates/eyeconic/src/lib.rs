//! Eyeconic relay library.
//!
//! Forwards chat prompts (optionally with an image) to a hosted language model,
//! records every successful exchange and serves the history back.

pub mod api;
pub mod app_config;
pub mod attachment;
pub mod chat;
pub mod db;
pub mod history;
pub mod inference;
