//! Filesystem-backed image source.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::SourceError;

use super::ImageSource;

/// Image source that reads originals from a directory on local disk.
///
/// Identifiers are plain file names inside the root directory. Anything
/// that would escape the root (path separators, `..`, absolute paths) is
/// reported as not found rather than resolved.
pub struct FsImageSource {
    root: PathBuf,
}

impl FsImageSource {
    /// Create a source rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory originals are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an identifier to a path inside the root, rejecting anything
    /// that is not a single normal path component.
    fn resolve(&self, id: &str) -> Option<PathBuf> {
        if id.is_empty() || id.contains('/') || id.contains('\\') {
            return None;
        }
        let candidate = Path::new(id);
        let mut components = candidate.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Some(self.root.join(candidate)),
            _ => None,
        }
    }
}

#[async_trait]
impl ImageSource for FsImageSource {
    async fn exists(&self, id: &str) -> bool {
        match self.resolve(id) {
            Some(path) => tokio::fs::try_exists(&path).await.unwrap_or(false),
            None => false,
        }
    }

    async fn read(&self, id: &str) -> Result<Bytes, SourceError> {
        let path = self
            .resolve(id)
            .ok_or_else(|| SourceError::NotFound(id.to_string()))?;

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SourceError::NotFound(id.to_string()))
            }
            Err(e) => Err(SourceError::Io(format!("{}: {}", id, e))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
