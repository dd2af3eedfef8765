//! Ingestion error types.

use thiserror::Error;
use wall_media::MediaError;
use wall_store::StoreError;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors surfaced by the ingestion pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Internal fault whose detail has already been logged. Uploaders see
    /// this opaque message; only their own mistakes get specifics.
    #[error("Media processing failed")]
    ProcessingFailed,
}

impl IngestError {
    /// Whether the upload itself was at fault (and the message is safe
    /// and useful to show the uploader).
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Media(e) if e.is_user_error())
    }
}
