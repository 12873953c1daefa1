//! Receipt image preprocessing
//!
//! Oversized photos are resized to fit the configured bound and re-encoded
//! as JPEG before being base64-encoded for transport. Optimization is
//! best-effort: a decode or encode failure falls back to the original bytes
//! so a weird-but-accepted upload never fails just because we couldn't
//! shrink it. The only hard failure here is the encoded payload guard.

use std::io::Cursor;

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::error::{Error, Result};

/// Transport-ready image payload
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub base64: String,
    pub media_type: String,
}

/// Prepare raw upload bytes for submission to a vision model
///
/// Page-document formats (PDF) are passed through untouched; images are
/// resized to fit `image_max_dimension` (aspect preserved, never upscaled)
/// and re-encoded as JPEG at the configured quality.
pub fn prepare_image(
    bytes: &[u8],
    content_type: &str,
    config: &PipelineConfig,
) -> Result<EncodedImage> {
    let is_document = content_type.eq_ignore_ascii_case("application/pdf");

    let (payload, media_type) = if !is_document {
        if let Some(max_dim) = config.image_max_dimension {
            match optimize(bytes, max_dim, config.image_quality) {
                Some(jpeg) => (jpeg, "image/jpeg".to_string()),
                None => {
                    warn!("Receipt optimization failed, submitting original bytes");
                    (bytes.to_vec(), content_type.to_string())
                }
            }
        } else {
            (bytes.to_vec(), content_type.to_string())
        }
    } else {
        (bytes.to_vec(), content_type.to_string())
    };

    let encoded = base64::engine::general_purpose::STANDARD.encode(&payload);
    if encoded.len() > config.max_encoded_len {
        return Err(Error::ImageTooLarge {
            encoded_len: encoded.len(),
            limit: config.max_encoded_len,
        });
    }

    Ok(EncodedImage {
        base64: encoded,
        media_type,
    })
}

/// Resize-to-fit and JPEG re-encode; None on any failure
fn optimize(bytes: &[u8], max_dim: u32, quality: u8) -> Option<Vec<u8>> {
    let img = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(e) => {
            debug!("Could not decode receipt image: {}", e);
            return None;
        }
    };

    let (width, height) = (img.width(), img.height());
    let img = if width.max(height) > max_dim {
        img.resize(max_dim, max_dim, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buf = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    match rgb.write_with_encoder(encoder) {
        Ok(()) => Some(buf.into_inner()),
        Err(e) => {
            debug!("Could not re-encode receipt image: {}", e);
            None
        }
    }
}
