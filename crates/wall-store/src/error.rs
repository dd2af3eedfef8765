//! Store error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while talking to the persistence layer or the
/// show directory tree.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Show not found: {0}")]
    ShowNotFound(String),

    #[error("Media not found: {0}")]
    MediaNotFound(String),

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn show_not_found(id: impl std::fmt::Display) -> Self {
        Self::ShowNotFound(id.to_string())
    }

    pub fn media_not_found(id: impl std::fmt::Display) -> Self {
        Self::MediaNotFound(id.to_string())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
