//! Cascade removal of media and their derived artifacts.

use tokio::fs;
use tracing::{info, warn};

use wall_models::{MediaRecord, ShowId};

use crate::error::StoreResult;
use crate::layout::ShowLayout;
use crate::store::ShowStore;

/// Remove a media item's stored file and its thumbnail cache directory.
/// Missing artifacts are tolerated; removal must be re-runnable after a
/// partial failure.
pub async fn remove_media_artifacts(layout: &ShowLayout, record: &MediaRecord) -> StoreResult<()> {
    match fs::remove_file(&record.file_path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Media file already absent: {}", record.file_path.display());
        }
        Err(e) => return Err(e.into()),
    }

    let thumb_dir = layout.thumbnails_dir(record.show, record.id);
    match fs::remove_dir_all(&thumb_dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Discard one media item entirely: record first, then file and
/// thumbnails. Row-first ordering means a crash mid-discard leaves an
/// orphaned file (harmless, re-collectable) rather than a dangling row.
pub async fn discard_media(
    store: &dyn ShowStore,
    layout: &ShowLayout,
    record: &MediaRecord,
) -> StoreResult<()> {
    store.delete_media(record.id).await?;
    remove_media_artifacts(layout, record).await?;
    info!("Discarded media {} ({})", record.id, record.title);
    Ok(())
}

/// Discard every media item attached to `show`. Stored files were
/// normalized against the show's previous playback contract, so when the
/// frame count changes they are all invalid at once; re-normalization is
/// not possible because trimmed frames are gone. Returns how many items
/// were discarded.
pub async fn purge_show_media(
    store: &dyn ShowStore,
    layout: &ShowLayout,
    show: ShowId,
) -> StoreResult<u32> {
    let records = store.list_show_media(show).await?;
    let mut discarded = 0u32;
    for record in &records {
        discard_media(store, layout, record).await?;
        discarded += 1;
    }

    info!("Purged {} media item(s) from show {}", discarded, show);
    Ok(discarded)
}
