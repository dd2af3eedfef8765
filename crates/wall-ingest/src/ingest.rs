//! The ingestion state machine.
//!
//! ```text
//! RECEIVED -> VALIDATING -> NORMALIZING_INPLACE -> CONFORMANT
//!                        \-> CONVERTING          -> CONFORMANT
//!                         \-> (any error)         -> FAILED
//! ```
//!
//! FAILED is terminal and total: the uploaded file is removed and the
//! record deleted, so no record ever points at a missing or half-processed
//! file. Rejections keep their message for the uploader; internal faults
//! are logged in full and surfaced opaquely.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use uuid::Uuid;

use wall_media::{
    crop_duration, crop_image_resolution, crop_resolution, crop_to_path, image_to_video,
    remove_if_exists, MediaError, Transcoder,
};
use wall_models::{MediaKind, MediaRecord, PipelineConfig, PlaybackContract};
use wall_store::ShowStore;

use crate::error::{IngestError, IngestResult};
use crate::validate::validate_upload;

/// States an upload moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    Received,
    Validating,
    NormalizingInPlace,
    Converting,
    Conformant,
    Failed,
}

impl fmt::Display for IngestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Received => "RECEIVED",
            Self::Validating => "VALIDATING",
            Self::NormalizingInPlace => "NORMALIZING_INPLACE",
            Self::Converting => "CONVERTING",
            Self::Conformant => "CONFORMANT",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// One upload to run through the pipeline. The file already sits at
/// `record.file_path` and the record is already persisted; ingestion
/// either normalizes the file in place (or beside it) or unwinds both.
#[derive(Debug)]
pub struct IngestRequest<'a> {
    pub record: &'a MediaRecord,
    /// Mime type the uploader declared.
    pub mime: &'a str,
    /// Caller-chosen crop window origin, pre-validated against the
    /// source resolution.
    pub crop_x: u32,
    pub crop_y: u32,
}

/// Run one upload through validation and normalization. On success the
/// stored file satisfies the show's playback contract and the returned
/// path is where the record now points. On any failure the upload is
/// rolled back entirely.
pub async fn ingest_upload(
    transcoder: &dyn Transcoder,
    cfg: &PipelineConfig,
    store: &dyn ShowStore,
    request: IngestRequest<'_>,
) -> IngestResult<PathBuf> {
    let record = request.record;
    transition(record, IngestState::Received);

    match run_pipeline(transcoder, cfg, store, &request).await {
        Ok(final_path) => {
            transition(record, IngestState::Conformant);
            info!("Media {} stored at {}", record.id, final_path.display());
            Ok(final_path)
        }
        Err(e) => {
            transition(record, IngestState::Failed);
            rollback(store, record).await;
            if e.is_user_error() {
                info!("Rejected upload {}: {}", record.id, e);
                Err(e)
            } else {
                error!("Ingestion of {} failed: {}", record.id, e);
                Err(IngestError::ProcessingFailed)
            }
        }
    }
}

async fn run_pipeline(
    transcoder: &dyn Transcoder,
    cfg: &PipelineConfig,
    store: &dyn ShowStore,
    request: &IngestRequest<'_>,
) -> IngestResult<PathBuf> {
    let record = request.record;
    let path = record.file_path.as_path();

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let kind = MediaKind::classify(request.mime, &extension)
        .ok_or_else(|| MediaError::UnsupportedFormat(request.mime.to_string()))?;

    let contract = store.get_target(record.show).await?;

    transition(record, IngestState::Validating);
    validate_upload(transcoder, cfg, path, kind, &contract).await?;

    let target_frames = u64::from(contract.frame_count);

    if kind != MediaKind::Image && extension == cfg.video_ext {
        // Already in the canonical container: repair in place.
        transition(record, IngestState::NormalizingInPlace);
        crop_duration(transcoder, cfg, path, target_frames, kind).await?;
        crop_resolution(transcoder, cfg, path, request.crop_x, request.crop_y, target_frames)
            .await?;
        return Ok(path.to_path_buf());
    }

    transition(record, IngestState::Converting);
    let converted = converted_path(path, &cfg.video_ext);

    let result: IngestResult<()> = async {
        match kind {
            MediaKind::Video | MediaKind::Gif => {
                convert_clip(transcoder, cfg, request, kind, &converted, target_frames).await?;
            }
            MediaKind::Image => {
                convert_still(transcoder, cfg, request, &contract, &converted).await?;
            }
        }
        store.repoint_media_file(record.id, &converted).await?;
        remove_if_exists(path).await?;
        Ok(())
    }
    .await;

    if let Err(e) = result {
        // The original is the rollback's problem; the conversion output
        // is ours on every failure, a failed repoint included, so no
        // file can outlive its record.
        if let Err(cleanup_err) = remove_if_exists(&converted).await {
            error!("Could not remove conversion output: {}", cleanup_err);
        }
        return Err(e);
    }

    Ok(converted)
}

/// Trim the clip in its native container, then crop-and-re-encode into
/// the canonical one.
async fn convert_clip(
    transcoder: &dyn Transcoder,
    cfg: &PipelineConfig,
    request: &IngestRequest<'_>,
    kind: MediaKind,
    converted: &Path,
    target_frames: u64,
) -> IngestResult<()> {
    let path = request.record.file_path.as_path();
    crop_duration(transcoder, cfg, path, target_frames, kind).await?;
    crop_to_path(
        transcoder,
        cfg,
        path,
        converted,
        request.crop_x,
        request.crop_y,
        target_frames,
    )
    .await?;
    Ok(())
}

/// Crop the still to the playback window, then loop it into a video of
/// the exact target length.
async fn convert_still(
    transcoder: &dyn Transcoder,
    cfg: &PipelineConfig,
    request: &IngestRequest<'_>,
    contract: &PlaybackContract,
    converted: &Path,
) -> IngestResult<()> {
    let path = request.record.file_path.as_path();
    crop_image_resolution(transcoder, cfg, path, request.crop_x, request.crop_y).await?;
    image_to_video(
        transcoder,
        cfg,
        path,
        converted,
        contract.duration_secs(),
        cfg.frame_rate,
        u64::from(contract.frame_count),
    )
    .await?;
    Ok(())
}

/// `{stem}_{uuid}.{ext}` beside the original, unique so a retry of the
/// same upload never collides with a stale output.
fn converted_path(original: &Path, ext: &str) -> PathBuf {
    let stem = original
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("media");
    original.with_file_name(format!("{}_{}.{}", stem, Uuid::new_v4(), ext))
}

/// Best-effort unwind: remove the stored file, then the record. Failures
/// here are logged and swallowed so the original error stays visible.
async fn rollback(store: &dyn ShowStore, record: &MediaRecord) {
    if let Err(e) = remove_if_exists(&record.file_path).await {
        error!("Rollback could not remove {}: {}", record.file_path.display(), e);
    }

    match store.media_exists(record.id).await {
        Ok(true) => {
            if let Err(e) = store.delete_media(record.id).await {
                error!("Rollback could not delete record {}: {}", record.id, e);
            }
        }
        Ok(false) => {}
        Err(e) => error!("Rollback could not check record {}: {}", record.id, e),
    }
}

fn transition(record: &MediaRecord, state: IngestState) {
    debug!("Media {} -> {}", record.id, state);
}
