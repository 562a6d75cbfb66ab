//! Chat service.
//!
//! One linear attempt per request: normalize the image (if any), call the
//! inference API, store the image, record the exchange. Nothing is persisted
//! unless the inference call succeeded.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::attachment::{self, AttachmentError, MediaStore};
use crate::history::{CreateExchange, Exchange, ExchangeRepository, ExchangeSource};
use crate::inference::{CompletionInput, InferenceApi, InferenceError};

/// Errors from a chat attempt.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Prompt is required")]
    MissingPrompt,

    #[error("attachment error: {0}")]
    Attachment(#[from] AttachmentError),

    #[error("inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("storage error: {0:#}")]
    Storage(anyhow::Error),
}

/// An uploaded image as received from the client.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Bytes,
}

/// One chat request after transport decoding.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub prompt: Option<String>,
    pub image: Option<ImageUpload>,
    pub source: ExchangeSource,
}

impl ChatRequest {
    pub fn text(prompt: impl Into<String>, source: ExchangeSource) -> Self {
        Self {
            prompt: Some(prompt.into()),
            image: None,
            source,
        }
    }
}

/// Service that relays prompts and records exchanges.
pub struct ChatService {
    repo: ExchangeRepository,
    inference: Arc<dyn InferenceApi>,
    media: MediaStore,
}

impl ChatService {
    pub fn new(
        repo: ExchangeRepository,
        inference: Arc<dyn InferenceApi>,
        media: MediaStore,
    ) -> Self {
        Self {
            repo,
            inference,
            media,
        }
    }

    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    /// Relay one prompt and record the resulting exchange.
    #[instrument(skip(self, request), fields(source = %request.source, has_image = request.image.is_some()))]
    pub async fn chat(&self, request: ChatRequest) -> Result<Exchange, ChatError> {
        let prompt = request
            .prompt
            .filter(|p| !p.trim().is_empty())
            .ok_or(ChatError::MissingPrompt)?;

        let image = match request.image.filter(|i| !i.bytes.is_empty()) {
            Some(upload) => Some(attachment::normalize_upload(upload.bytes).await?),
            None => None,
        };

        let input = match &image {
            Some(img) => CompletionInput::with_image(prompt.clone(), img.to_data_url()),
            None => CompletionInput::text(prompt.clone()),
        };
        let reply = self.inference.complete(&input).await?;

        let image_ref = match &image {
            Some(img) => Some(self.media.save(img).await?),
            None => None,
        };

        let recorded = self
            .repo
            .insert(CreateExchange {
                prompt,
                image: image_ref.clone(),
                response: reply,
                source: request.source,
            })
            .await;

        match recorded {
            Ok(exchange) => {
                info!(id = exchange.id, "exchange recorded");
                Ok(exchange)
            }
            Err(e) => {
                if let Some(reference) = image_ref
                    && let Err(cleanup) = self.media.remove(&reference).await
                {
                    warn!(reference = %reference, error = %cleanup, "failed to remove orphaned attachment");
                }
                Err(ChatError::Storage(e))
            }
        }
    }

    /// All exchanges, newest first.
    pub async fn history(&self) -> anyhow::Result<Vec<Exchange>> {
        self.repo.list_newest_first().await
    }
}
