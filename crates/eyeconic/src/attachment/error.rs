//! Attachment error types.

use thiserror::Error;

/// Result type for attachment operations.
pub type AttachmentResult<T> = Result<T, AttachmentError>;

/// Errors that can occur while processing or storing an uploaded image.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// Bytes are not a decodable image.
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// JPEG re-encoding failed.
    #[error("failed to encode image as JPEG: {0}")]
    Encode(#[source] image::ImageError),

    /// Writing or removing the stored file failed.
    #[error("media storage error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A stored reference escaped the media root.
    #[error("invalid media reference: {0}")]
    InvalidReference(String),

    /// The blocking decode task panicked or was cancelled.
    #[error("image processing task failed: {0}")]
    Task(String),
}
