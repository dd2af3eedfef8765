//! In-memory [`ShowStore`] for exercising pipeline orchestration.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use wall_models::{MediaId, MediaRecord, PlaybackContract, ShowId};

use crate::error::{StoreError, StoreResult};
use crate::store::ShowStore;

#[derive(Default)]
struct Tables {
    shows: HashMap<ShowId, PlaybackContract>,
    media: HashMap<MediaId, MediaRecord>,
}

/// Hash-map-backed store. Records are cloned in and out, so tests can
/// hold a `MediaRecord` across mutations without aliasing the tables.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_show(&self, show: ShowId, contract: PlaybackContract) {
        self.tables.lock().unwrap().shows.insert(show, contract);
    }

    pub fn insert_media(&self, record: MediaRecord) {
        self.tables.lock().unwrap().media.insert(record.id, record);
    }

    pub fn get_media(&self, media: MediaId) -> Option<MediaRecord> {
        self.tables.lock().unwrap().media.get(&media).cloned()
    }
}

#[async_trait]
impl ShowStore for MemoryStore {
    async fn get_target(&self, show: ShowId) -> StoreResult<PlaybackContract> {
        self.tables
            .lock()
            .unwrap()
            .shows
            .get(&show)
            .copied()
            .ok_or_else(|| StoreError::show_not_found(show))
    }

    async fn list_show_media(&self, show: ShowId) -> StoreResult<Vec<MediaRecord>> {
        let tables = self.tables.lock().unwrap();
        let mut records: Vec<_> = tables
            .media
            .values()
            .filter(|r| r.show == show)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.uploaded_at);
        Ok(records)
    }

    async fn repoint_media_file(&self, media: MediaId, new_path: &Path) -> StoreResult<()> {
        let mut tables = self.tables.lock().unwrap();
        let record = tables
            .media
            .get_mut(&media)
            .ok_or_else(|| StoreError::media_not_found(media))?;
        record.file_path = new_path.to_path_buf();
        Ok(())
    }

    async fn delete_media(&self, media: MediaId) -> StoreResult<()> {
        self.tables
            .lock()
            .unwrap()
            .media
            .remove(&media)
            .map(|_| ())
            .ok_or_else(|| StoreError::media_not_found(media))
    }

    async fn media_exists(&self, media: MediaId) -> StoreResult<bool> {
        Ok(self.tables.lock().unwrap().media.contains_key(&media))
    }
}
