//! Cache key construction for image derivatives.
//!
//! A derivative is identified by the source asset plus the effective output
//! width. Two requests that normalize to the same `(source, width)` pair
//! always share one cache entry and one in-flight computation.

use std::sync::Arc;

/// Fallback output width when a request supplies no usable width.
pub const DEFAULT_WIDTH: u32 = 800;

/// Cache key for a computed derivative.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivativeKey {
    /// Source asset identifier (file name)
    pub source_id: Arc<str>,

    /// Effective output width in pixels
    pub width: u32,
}

impl DerivativeKey {
    /// Create a new derivative key.
    pub fn new(source_id: impl Into<Arc<str>>, width: u32) -> Self {
        Self {
            source_id: source_id.into(),
            width,
        }
    }
}

/// Normalize a raw width parameter into an effective width.
///
/// A missing, non-numeric, or non-positive value falls back to
/// `default_width`. Never fails; malformed input is a client hint we can
/// safely ignore, not an error.
pub fn normalize_width(raw: Option<&str>, default_width: u32) -> u32 {
    match raw.and_then(|s| s.trim().parse::<u32>().ok()) {
        Some(w) if w > 0 => w,
        _ => default_width,
    }
}

// =============================================================================
// Tests
// =============================================================================
