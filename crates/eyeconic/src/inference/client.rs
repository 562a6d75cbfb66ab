//! HTTP client for OpenAI-compatible chat-completion APIs.

use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::error::{InferenceError, InferenceResult};
use super::types::*;
use crate::app_config::InferenceConfig;

/// Client for the hosted chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    /// HTTP client.
    client: Client,
    /// Base URL without trailing slash (e.g., "https://openrouter.ai/api/v1").
    base_url: String,
    api_key: String,
    provider: Provider,
    /// Sent as `HTTP-Referer` for provider-side attribution.
    referer: Option<String>,
    /// Sent as `X-Title`.
    app_title: Option<String>,
}

impl InferenceClient {
    /// Create a new client.
    pub fn new(
        provider: Provider,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> InferenceResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url: String = base_url.into();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            provider,
            referer: None,
            app_title: None,
        })
    }

    /// Build a client for the configured provider.
    pub fn from_config(config: &InferenceConfig) -> InferenceResult<Self> {
        let api_key = config
            .api_key()
            .ok_or(InferenceError::MissingApiKey(config.provider))?;

        let client = Self::new(
            config.provider,
            config.base_url(),
            api_key,
            Duration::from_secs(config.timeout_secs),
        )?;
        // Attribution headers are an OpenRouter convention.
        match config.provider {
            Provider::OpenRouter => {
                Ok(client.with_attribution(config.referer.clone(), config.app_title.clone()))
            }
            Provider::Gemini => Ok(client),
        }
    }

    pub fn with_attribution(mut self, referer: Option<String>, app_title: Option<String>) -> Self {
        self.referer = referer.filter(|r| !r.is_empty());
        self.app_title = app_title.filter(|t| !t.is_empty());
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one chat-completion request and return the reply text.
    #[instrument(skip(self, input), fields(provider = %self.provider, multimodal = input.is_multimodal()))]
    pub async fn complete(&self, input: &CompletionInput) -> InferenceResult<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest::new(self.provider.model(), input);

        let mut request = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body);
        if let Some(ref referer) = self.referer {
            request = request.header("HTTP-Referer", referer);
        }
        if let Some(ref title) = self.app_title {
            request = request.header("X-Title", title);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                InferenceError::ConnectionFailed {
                    url: url.clone(),
                    message: e.to_string(),
                }
            } else {
                InferenceError::RequestFailed(e)
            }
        })?;

        let completion: ChatCompletionResponse = self.handle_response(response).await?;
        if let Some(error) = completion.error.as_ref() {
            return Err(InferenceError::ApiError {
                status: StatusCode::OK.as_u16(),
                message: error.message.clone(),
            });
        }

        if let Some(usage) = completion.usage.as_ref() {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "inference usage"
            );
        }

        completion
            .reply_text()
            .map(str::to_string)
            .ok_or(InferenceError::EmptyResponse)
    }

    /// Handle response and parse JSON or error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> InferenceResult<T> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| InferenceError::ParseError(format!("Failed to parse response: {}", e)));
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(InferenceError::Unauthorized);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorResponse>(&text)
            .map(|e| e.error.message)
            .unwrap_or(text);
        warn!(status = status.as_u16(), message = %message, "inference API returned an error");

        Err(InferenceError::ApiError {
            status: status.as_u16(),
            message,
        })
    }
}
