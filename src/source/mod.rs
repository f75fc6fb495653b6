//! Source abstraction for original image bytes.
//!
//! The derivative pipeline reads whole source files through the
//! [`ImageSource`] trait, which keeps the pipeline independent of where
//! originals live. The production implementation is [`FsImageSource`],
//! backed by a local directory; tests substitute in-memory mocks.

mod fs;

pub use fs::FsImageSource;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::SourceError;

/// Trait for reading original image assets by identifier.
///
/// Implementations must be thread-safe; the service shares one instance
/// across all request handlers.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Check whether an asset with this identifier exists.
    async fn exists(&self, id: &str) -> bool;

    /// Read the complete bytes of an asset.
    ///
    /// Fails with [`SourceError::NotFound`] if the asset does not exist.
    async fn read(&self, id: &str) -> Result<Bytes, SourceError>;
}
