//! Media kind detection for source identifiers.
//!
//! Derivatives are only computed for raster formats the pipeline can decode
//! (JPEG, PNG, WebP). Every other kind is served as-is with its native
//! content type, so unknown files never fail a request; they just skip the
//! resize/re-encode step.

// =============================================================================
// MediaKind
// =============================================================================

/// Media kind of a source asset, derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// JPEG raster image (transcoded)
    Jpeg,

    /// PNG raster image (transcoded)
    Png,

    /// WebP raster image (transcoded)
    WebP,

    /// GIF image (passthrough; animations would not survive re-encoding)
    Gif,

    /// SVG vector image (passthrough)
    Svg,

    /// Favicon (passthrough)
    Ico,

    /// BMP raster image (passthrough; not in the transcode set)
    Bmp,

    /// TIFF raster image (passthrough; not in the transcode set)
    Tiff,

    /// AVIF image (passthrough; no decoder in the pipeline)
    Avif,

    /// Anything else (passthrough as opaque bytes)
    Unknown,
}

impl MediaKind {
    /// Detect the media kind from a source identifier's extension.
    ///
    /// Matching is case-insensitive; an identifier with no extension is
    /// `Unknown`.
    pub fn from_identifier(id: &str) -> Self {
        let ext = match id.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => return MediaKind::Unknown,
        };

        match ext.as_str() {
            "jpg" | "jpeg" => MediaKind::Jpeg,
            "png" => MediaKind::Png,
            "webp" => MediaKind::WebP,
            "gif" => MediaKind::Gif,
            "svg" => MediaKind::Svg,
            "ico" => MediaKind::Ico,
            "bmp" => MediaKind::Bmp,
            "tif" | "tiff" => MediaKind::Tiff,
            "avif" => MediaKind::Avif,
            _ => MediaKind::Unknown,
        }
    }

    /// The MIME content type served for this kind.
    pub const fn content_type(&self) -> &'static str {
        match self {
            MediaKind::Jpeg => "image/jpeg",
            MediaKind::Png => "image/png",
            MediaKind::WebP => "image/webp",
            MediaKind::Gif => "image/gif",
            MediaKind::Svg => "image/svg+xml",
            MediaKind::Ico => "image/x-icon",
            MediaKind::Bmp => "image/bmp",
            MediaKind::Tiff => "image/tiff",
            MediaKind::Avif => "image/avif",
            MediaKind::Unknown => "application/octet-stream",
        }
    }

    /// Whether this kind goes through the decode/resize/encode pipeline.
    pub const fn is_raster(&self) -> bool {
        matches!(self, MediaKind::Jpeg | MediaKind::Png | MediaKind::WebP)
    }
}

// =============================================================================
// Tests
// =============================================================================
