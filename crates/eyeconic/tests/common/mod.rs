//! Test utilities and common setup.
#![allow(dead_code)]

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use eyeconic::api;
use eyeconic::app_config::ServerConfig;
use eyeconic::attachment::MediaStore;
use eyeconic::chat::ChatService;
use eyeconic::db::Database;
use eyeconic::history::ExchangeRepository;
use eyeconic::inference::{CompletionInput, InferenceApi, InferenceError, InferenceResult};
use tempfile::TempDir;

/// Inference stand-in that records every call.
pub struct MockInference {
    reply: Option<String>,
    calls: Mutex<Vec<CompletionInput>>,
}

impl MockInference {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<CompletionInput> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceApi for MockInference {
    async fn complete(&self, input: &CompletionInput) -> InferenceResult<String> {
        self.calls.lock().unwrap().push(input.clone());
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(InferenceError::ApiError {
                status: 502,
                message: "upstream unavailable".to_string(),
            }),
        }
    }
}

/// A router over an in-memory database and a temporary media root.
pub struct TestApp {
    pub router: Router,
    pub database: Database,
    pub repo: ExchangeRepository,
    pub inference: Arc<MockInference>,
    pub media_dir: TempDir,
}

pub async fn test_app_with(inference: Arc<MockInference>) -> TestApp {
    let database = Database::in_memory()
        .await
        .expect("Failed to create in-memory database");
    let repo = ExchangeRepository::new(database.pool().clone());
    let media_dir = TempDir::new().expect("Failed to create media dir");

    let chat = ChatService::new(
        repo.clone(),
        inference.clone(),
        MediaStore::new(media_dir.path()),
    );
    let state = api::AppState::new(chat);
    let router = api::create_router_with_config(state, &ServerConfig::default());

    TestApp {
        router,
        database,
        repo,
        inference,
        media_dir,
    }
}

pub async fn test_app() -> TestApp {
    test_app_with(MockInference::replying("Hello from the model")).await
}

/// A small PNG, encoded in memory.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 128]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("Failed to encode test PNG");
    out.into_inner()
}

pub const MULTIPART_BOUNDARY: &str = "eyeconic-test-boundary";

/// Build a multipart/form-data body with an optional prompt and optional image part.
pub fn multipart_body(prompt: Option<&str>, image: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(prompt) = prompt {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"prompt\"\r\n\r\n{prompt}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(image) = image {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"photo.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(image);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
}
