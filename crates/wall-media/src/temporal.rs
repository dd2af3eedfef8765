//! Temporal trimming.
//!
//! The temporal analogue of the spatial cropper, with the same scratch
//! discipline. Kept separate because resolution-cropping must also repair
//! frame counts as a side effect of re-encoding, while pure trimming
//! never touches resolution.

use std::path::Path;
use tracing::{debug, error, info};

use wall_models::{MediaKind, PipelineConfig};

use crate::error::{MediaError, MediaResult};
use crate::scratch::ScratchFile;
use crate::transcoder::{TranscodeOp, Transcoder};

/// Truncate the video or GIF at `path` in place to exactly
/// `target_frames` leading frames. No-op when the count already matches.
///
/// The output is re-probed; any mismatch is a trim-integrity fault naming
/// the media type.
pub async fn crop_duration(
    transcoder: &dyn Transcoder,
    cfg: &PipelineConfig,
    path: &Path,
    target_frames: u64,
    kind: MediaKind,
) -> MediaResult<()> {
    let probe = transcoder.probe(path).await?;
    if probe.frame_count == target_frames {
        debug!("{} already at {} frames, skipping trim", path.display(), target_frames);
        return Ok(());
    }

    let ext = if kind == MediaKind::Gif { "gif" } else { &cfg.video_ext };
    let scratch = ScratchFile::claim(path, &cfg.scratch_dir, ext).await?;

    let result = trim_and_verify(transcoder, scratch.path(), path, target_frames, kind).await;

    match result {
        Ok(()) => scratch.cleanup().await,
        Err(e) => {
            if let Err(cleanup_err) = scratch.cleanup().await {
                error!("Scratch cleanup failed after trim error: {}", cleanup_err);
            }
            Err(e)
        }
    }
}

async fn trim_and_verify(
    transcoder: &dyn Transcoder,
    input: &Path,
    output: &Path,
    target_frames: u64,
    kind: MediaKind,
) -> MediaResult<()> {
    transcoder
        .transcode(
            input,
            output,
            &TranscodeOp::Trim {
                end_frame: target_frames,
            },
        )
        .await?;

    let trimmed = transcoder.probe(output).await?;
    if trimmed.frame_count != target_frames {
        return Err(MediaError::TrimIntegrity {
            media: kind.label(),
            expected: target_frames,
            actual: trimmed.frame_count,
        });
    }

    info!("Trimmed {} to {} frames", output.display(), target_frames);
    Ok(())
}
