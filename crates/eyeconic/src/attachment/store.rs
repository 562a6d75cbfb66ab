//! On-disk storage for chat attachments.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use super::codec::NormalizedImage;
use super::error::{AttachmentError, AttachmentResult};

/// Subdirectory (relative to the media root) that holds chat images.
pub const CHAT_IMAGES_DIR: &str = "chat_images";

/// URL prefix under which the media root is served.
pub const MEDIA_URL_PREFIX: &str = "/media";

/// Stores normalized attachments under a media root and hands out relative references.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write the image and return its media-relative reference (`chat_images/<uuid>.jpg`).
    pub async fn save(&self, image: &NormalizedImage) -> AttachmentResult<String> {
        let dir = self.root.join(CHAT_IMAGES_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| AttachmentError::Io {
                path: dir.display().to_string(),
                source,
            })?;

        let reference = format!("{}/{}.jpg", CHAT_IMAGES_DIR, Uuid::new_v4());
        let path = self.root.join(&reference);
        tokio::fs::write(&path, image.as_bytes())
            .await
            .map_err(|source| AttachmentError::Io {
                path: path.display().to_string(),
                source,
            })?;

        debug!(reference = %reference, bytes = image.as_bytes().len(), "stored attachment");
        Ok(reference)
    }

    /// Remove a stored file. Used to roll back when the exchange could not be recorded.
    pub async fn remove(&self, reference: &str) -> AttachmentResult<()> {
        let path = self.resolve(reference)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(reference = %reference, "attachment already gone");
                Ok(())
            }
            Err(source) => Err(AttachmentError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// Absolute path for a reference. Rejects anything that is not a plain relative path.
    pub fn resolve(&self, reference: &str) -> AttachmentResult<PathBuf> {
        let relative = Path::new(reference);
        let plain = !reference.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(AttachmentError::InvalidReference(reference.to_string()));
        }
        Ok(self.root.join(relative))
    }

    /// Public URL for a stored reference.
    pub fn public_url(reference: &str) -> String {
        format!(
            "{}/{}",
            MEDIA_URL_PREFIX,
            reference.trim_start_matches('/')
        )
    }
}
