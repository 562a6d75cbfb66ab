//! Inference client error types.

use thiserror::Error;

use super::types::Provider;

/// Result type for inference operations.
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Errors that can occur while calling the inference API.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Could not reach the provider.
    #[error("Failed to connect to inference API at {url}: {message}")]
    ConnectionFailed { url: String, message: String },

    /// Provider rejected the API key.
    #[error("Unauthorized: inference API rejected the key")]
    Unauthorized,

    /// Provider returned an error status or error body.
    #[error("Inference API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Response parsed but carried no reply text.
    #[error("Inference API returned no reply")]
    EmptyResponse,

    /// No key configured for the selected provider.
    #[error("No API key configured for provider {0}")]
    MissingApiKey(Provider),
}
