//! Image normalization for multimodal requests.

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;

use super::error::{AttachmentError, AttachmentResult};

/// JPEG quality used when re-encoding uploads.
pub const JPEG_QUALITY: u8 = 75;

/// An uploaded image re-encoded as baseline RGB JPEG.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    jpeg: Vec<u8>,
    width: u32,
    height: u32,
}

impl NormalizedImage {
    /// Decode any supported format, drop alpha/palette/grayscale to RGB and re-encode as JPEG.
    pub fn from_upload(bytes: &[u8]) -> AttachmentResult<Self> {
        let decoded = image::load_from_memory(bytes).map_err(AttachmentError::Decode)?;
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
            .encode_image(&rgb)
            .map_err(AttachmentError::Encode)?;

        Ok(Self {
            jpeg,
            width,
            height,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.jpeg
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Standard base64 of the JPEG bytes.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.jpeg)
    }

    /// `data:` URL suitable for an `image_url` content part.
    pub fn to_data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", self.to_base64())
    }
}
