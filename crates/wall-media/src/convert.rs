//! Still-image to video conversion.

use std::path::Path;
use tracing::{error, info};

use wall_models::PipelineConfig;

use crate::error::{MediaError, MediaResult};
use crate::scratch::ScratchFile;
use crate::transcoder::{TranscodeOp, Transcoder};

/// Synthesize a video at `out_path` by looping the still at `image_path`
/// for `duration_secs` at `fps`, then pad (by cloning the final frame) or
/// trim until the output holds exactly `target_frames` frames.
///
/// The input image is left untouched; the caller deletes it once the
/// record is repointed.
pub async fn image_to_video(
    transcoder: &dyn Transcoder,
    cfg: &PipelineConfig,
    image_path: &Path,
    out_path: &Path,
    duration_secs: f64,
    fps: u32,
    target_frames: u64,
) -> MediaResult<()> {
    transcoder
        .transcode(
            image_path,
            out_path,
            &TranscodeOp::LoopImage { duration_secs, fps },
        )
        .await?;

    let produced = transcoder.probe(out_path).await?.frame_count;

    if produced < target_frames {
        let shortfall_secs = (target_frames - produced) as f64 / f64::from(fps);
        rewrite(
            transcoder,
            cfg,
            out_path,
            &TranscodeOp::PadClone {
                stop_duration_secs: shortfall_secs,
            },
        )
        .await?;
    } else if produced > target_frames {
        rewrite(
            transcoder,
            cfg,
            out_path,
            &TranscodeOp::Trim {
                end_frame: target_frames,
            },
        )
        .await?;
    }

    // Padding and trimming land on the target by construction, but both
    // go through a lossy re-encode, so hold this path to the same
    // post-condition as the croppers.
    let final_count = transcoder.probe(out_path).await?.frame_count;
    if final_count != target_frames {
        return Err(MediaError::ConvertIntegrity {
            expected: target_frames,
            actual: final_count,
        });
    }

    info!(
        "Converted {} to {} ({} frames at {}fps)",
        image_path.display(),
        out_path.display(),
        target_frames,
        fps
    );
    Ok(())
}

/// Relocate `path` to scratch, run `op` back onto `path`, clean up.
async fn rewrite(
    transcoder: &dyn Transcoder,
    cfg: &PipelineConfig,
    path: &Path,
    op: &TranscodeOp,
) -> MediaResult<()> {
    let scratch = ScratchFile::claim(path, &cfg.scratch_dir, &cfg.video_ext).await?;

    let result = transcoder.transcode(scratch.path(), path, op).await;

    match result {
        Ok(()) => scratch.cleanup().await,
        Err(e) => {
            if let Err(cleanup_err) = scratch.cleanup().await {
                error!("Scratch cleanup failed after convert error: {}", cleanup_err);
            }
            Err(e)
        }
    }
}
