//! Image attachments: normalization for the inference request and storage for the history log.

mod codec;
mod error;
mod store;

pub use codec::{JPEG_QUALITY, NormalizedImage};
pub use error::{AttachmentError, AttachmentResult};
pub use store::{CHAT_IMAGES_DIR, MEDIA_URL_PREFIX, MediaStore};

/// Normalize an upload on the blocking pool; decoding large images is CPU-bound.
pub async fn normalize_upload(bytes: bytes::Bytes) -> AttachmentResult<NormalizedImage> {
    tokio::task::spawn_blocking(move || NormalizedImage::from_upload(&bytes))
        .await
        .map_err(|e| AttachmentError::Task(e.to_string()))?
}
