use thiserror::Error;

/// Errors from the image source collaborator (filesystem or mock storage).
///
/// All variants are `Clone` so a single terminal result can be handed to
/// every waiter of a coalesced fetch.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The requested source asset does not exist
    #[error("source not found: {0}")]
    NotFound(String),

    /// Unexpected I/O failure while reading the source
    #[error("source I/O error: {0}")]
    Io(String),
}

/// Errors produced while computing an image derivative.
#[derive(Debug, Clone, Error)]
pub enum DerivativeError {
    /// The source asset backing the derivative does not exist (HTTP 404)
    #[error("source not found: {source_id}")]
    SourceNotFound { source_id: String },

    /// The source bytes could not be decoded as an image
    #[error("decode error: {message}")]
    Decode { message: String },

    /// The resized image could not be encoded
    #[error("encode error: {message}")]
    Encode { message: String },

    /// I/O failure reading the source
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Unexpected internal failure (e.g. a lost worker task)
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl DerivativeError {
    /// Whether this error maps to a client-visible 404.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DerivativeError::SourceNotFound { .. }
                | DerivativeError::Source(SourceError::NotFound(_))
        )
    }
}
