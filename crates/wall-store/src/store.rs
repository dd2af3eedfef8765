//! The persistence collaborator interface.

use async_trait::async_trait;
use std::path::Path;

use wall_models::{MediaId, MediaRecord, PlaybackContract, ShowId};

use crate::error::StoreResult;

/// What the pipeline needs from the record store, and nothing more.
///
/// Each call is atomic from the pipeline's point of view; the pipeline
/// sequences them so that at every step either the record points at a
/// real file or the record is gone.
#[async_trait]
pub trait ShowStore: Send + Sync {
    /// The playback contract every media item of `show` must satisfy.
    async fn get_target(&self, show: ShowId) -> StoreResult<PlaybackContract>;

    /// All media records attached to `show`.
    async fn list_show_media(&self, show: ShowId) -> StoreResult<Vec<MediaRecord>>;

    /// Point `media`'s record at a new file path. Used when conversion
    /// writes the normalized output next to the original.
    async fn repoint_media_file(&self, media: MediaId, new_path: &Path) -> StoreResult<()>;

    /// Remove `media`'s record. Deleting an absent record is an error;
    /// callers that tolerate absence check `media_exists` first.
    async fn delete_media(&self, media: MediaId) -> StoreResult<()>;

    async fn media_exists(&self, media: MediaId) -> StoreResult<bool>;
}
