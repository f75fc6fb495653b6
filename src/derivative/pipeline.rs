//! Derivative production: read, resize, re-encode.
//!
//! The pipeline turns an original asset into servable bytes:
//!
//! 1. Read the full source through the [`ImageSource`].
//! 2. Non-raster kinds pass through untouched with their native content
//!    type.
//! 3. Raster kinds are decoded, downscaled to the requested width with the
//!    aspect ratio preserved (never upscaled), and re-encoded as JPEG at a
//!    fixed quality. One canonical output format keeps the cache key space
//!    bounded to `(source, width)`.
//!
//! Decode/resize/encode is CPU-bound and runs on the blocking thread pool
//! so it cannot stall the request reactor. Failures are terminal for the
//! invocation; the pipeline never retries.

use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tracing::debug;

use crate::error::{DerivativeError, SourceError};
use crate::media::MediaKind;
use crate::source::ImageSource;

/// Fixed JPEG quality for encoded derivatives.
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Content type of transcoded (non-passthrough) derivatives.
pub const OUTPUT_CONTENT_TYPE: &str = "image/jpeg";

/// A produced derivative: payload plus its content type.
#[derive(Debug, Clone)]
pub struct Derivative {
    /// Encoded (or passed-through) bytes
    pub data: Bytes,

    /// MIME type to serve the bytes with
    pub content_type: &'static str,
}

// =============================================================================
// DerivativePipeline
// =============================================================================

/// Produces width-adapted derivatives from an image source.
pub struct DerivativePipeline<S: ImageSource> {
    source: Arc<S>,
    quality: u8,
}

impl<S: ImageSource> DerivativePipeline<S> {
    /// Create a pipeline with the default output quality.
    pub fn new(source: Arc<S>) -> Self {
        Self::with_quality(source, DEFAULT_JPEG_QUALITY)
    }

    /// Create a pipeline with a specific output quality (1-100).
    pub fn with_quality(source: Arc<S>, quality: u8) -> Self {
        Self {
            source,
            quality: quality.clamp(1, 100),
        }
    }

    /// The underlying image source.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Produce a derivative of `source_id` bounded to `width` pixels.
    ///
    /// # Errors
    ///
    /// - [`DerivativeError::SourceNotFound`] if the asset does not exist
    /// - [`DerivativeError::Decode`] if the bytes are not a readable image
    /// - [`DerivativeError::Encode`] if re-encoding fails
    /// - [`DerivativeError::Source`] / [`DerivativeError::Internal`] for
    ///   I/O and worker failures
    pub async fn produce(
        &self,
        source_id: &str,
        width: u32,
    ) -> Result<Derivative, DerivativeError> {
        let data = self.source.read(source_id).await.map_err(|e| match e {
            SourceError::NotFound(_) => DerivativeError::SourceNotFound {
                source_id: source_id.to_string(),
            },
            other => DerivativeError::Source(other),
        })?;

        let kind = MediaKind::from_identifier(source_id);
        if !kind.is_raster() {
            debug!(source_id, kind = ?kind, "serving non-raster source as passthrough");
            return Ok(Derivative {
                data,
                content_type: kind.content_type(),
            });
        }

        let quality = self.quality;
        let encoded = tokio::task::spawn_blocking(move || transcode(&data, width, quality))
            .await
            .map_err(|e| DerivativeError::Internal {
                message: format!("transcode task failed: {}", e),
            })??;

        Ok(Derivative {
            data: encoded,
            content_type: OUTPUT_CONTENT_TYPE,
        })
    }
}

/// Decode, downscale, and re-encode raster bytes. Runs on the blocking pool.
fn transcode(data: &[u8], width: u32, quality: u8) -> Result<Bytes, DerivativeError> {
    let img = image::load_from_memory(data).map_err(|e| DerivativeError::Decode {
        message: e.to_string(),
    })?;

    // Downscale only: a request wider than the source re-encodes as-is.
    let img = if width < img.width() {
        img.resize(width, u32::MAX, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel; flatten before encoding.
    let rgb = img.to_rgb8();

    let mut output = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut output, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| DerivativeError::Encode {
            message: e.to_string(),
        })?;

    Ok(Bytes::from(output.into_inner()))
}

// =============================================================================
// Tests
// =============================================================================
