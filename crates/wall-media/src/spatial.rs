//! Spatial cropping.
//!
//! Cropping re-encodes, and re-encoding can alter the frame count, so the
//! cropper re-checks its own output and trims any overage back to the
//! show's target. Under-production is treated as transcoder corruption.

use std::path::Path;
use tracing::{debug, error, info};

use wall_models::{PipelineConfig, Resolution};

use crate::error::{MediaError, MediaResult};
use crate::gates::meets_resolution;
use crate::scratch::ScratchFile;
use crate::transcoder::{TranscodeOp, Transcoder};

/// Crop the video at `path` in place to the configured resolution,
/// anchored at `(crop_x, crop_y)`.
///
/// No-op when the file already matches the resolution exactly. The crop
/// offset is caller-supplied and trusted to be pre-validated against the
/// source resolution.
pub async fn crop_resolution(
    transcoder: &dyn Transcoder,
    cfg: &PipelineConfig,
    path: &Path,
    crop_x: u32,
    crop_y: u32,
    target_frames: u64,
) -> MediaResult<()> {
    let probe = transcoder.probe(path).await?;
    if meets_resolution(probe.resolution(), cfg.resolution, true) {
        debug!("{} already at {}, skipping crop", path.display(), cfg.resolution);
        return Ok(());
    }

    // Vacate the canonical path so a failed transcode cannot corrupt it.
    let scratch = ScratchFile::claim(path, &cfg.scratch_dir, &cfg.video_ext).await?;

    let result = crop_to_path(
        transcoder,
        cfg,
        scratch.path(),
        path,
        crop_x,
        crop_y,
        target_frames,
    )
    .await;

    match result {
        Ok(()) => scratch.cleanup().await,
        Err(e) => {
            if let Err(cleanup_err) = scratch.cleanup().await {
                error!("Scratch cleanup failed after crop error: {}", cleanup_err);
            }
            Err(e)
        }
    }
}

/// Crop a `cfg.resolution`-sized window from `input` to `output`, then
/// repair the output frame count if the re-encode over-produced.
///
/// Fails with a crop-integrity error if the output holds fewer frames
/// than `target_frames`: spatial cropping must never shorten a video.
pub async fn crop_to_path(
    transcoder: &dyn Transcoder,
    cfg: &PipelineConfig,
    input: &Path,
    output: &Path,
    crop_x: u32,
    crop_y: u32,
    target_frames: u64,
) -> MediaResult<()> {
    let Resolution { width, height } = cfg.resolution;

    transcoder
        .transcode(
            input,
            output,
            &TranscodeOp::Crop {
                x: crop_x,
                y: crop_y,
                width,
                height,
            },
        )
        .await?;

    let cropped = transcoder.probe(output).await?;
    if cropped.frame_count > target_frames {
        trim_overage(transcoder, cfg, output, target_frames).await?;
    } else if cropped.frame_count < target_frames {
        return Err(MediaError::CropIntegrity {
            width,
            height,
            actual: cropped.frame_count,
            expected: target_frames,
        });
    }

    info!(
        "Cropped {} to {} at offset ({}, {})",
        output.display(),
        cfg.resolution,
        crop_x,
        crop_y
    );
    Ok(())
}

/// Truncate a freshly cropped output back down to `target_frames`.
async fn trim_overage(
    transcoder: &dyn Transcoder,
    cfg: &PipelineConfig,
    path: &Path,
    target_frames: u64,
) -> MediaResult<()> {
    let scratch = ScratchFile::claim(path, &cfg.scratch_dir, &cfg.video_ext).await?;

    let result = transcoder
        .transcode(
            scratch.path(),
            path,
            &TranscodeOp::Trim {
                end_frame: target_frames,
            },
        )
        .await;

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

/// Crop a still image in place so it can be converted to video later.
/// Stills get no frame-count re-check; they have exactly one frame.
pub async fn crop_image_resolution(
    transcoder: &dyn Transcoder,
    cfg: &PipelineConfig,
    path: &Path,
    crop_x: u32,
    crop_y: u32,
) -> MediaResult<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or(&cfg.image_ext)
        .to_ascii_lowercase();

    let scratch = ScratchFile::claim(path, &cfg.scratch_dir, &ext).await?;

    let Resolution { width, height } = cfg.resolution;
    let result = transcoder
        .transcode(
            scratch.path(),
            path,
            &TranscodeOp::CropImage {
                x: crop_x,
                y: crop_y,
                width,
                height,
            },
        )
        .await;

    match result {
        Ok(()) => scratch.cleanup().await,
        Err(e) => {
            if let Err(cleanup_err) = scratch.cleanup().await {
                error!("Scratch cleanup failed after image crop error: {}", cleanup_err);
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeTranscoder, OpKind};
    use tempfile::TempDir;
    use tokio::fs;

    fn test_cfg(dir: &TempDir) -> PipelineConfig {
        PipelineConfig::default().with_scratch_dir(dir.path().join("tmp"))
    }

    fn scratch_file_count(cfg: &PipelineConfig) -> usize {
        std::fs::read_dir(&cfg.scratch_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_exact_resolution_is_noop() {
        let dir = TempDir::new().unwrap();
        let cfg = test_cfg(&dir);
        let path = dir.path().join("clip.mp4");
        FakeTranscoder::seed(&path, FakeTranscoder::video_probe(150, 854, 480, 30.0))
            .await
            .unwrap();
        let before = fs::read(&path).await.unwrap();

        let fake = FakeTranscoder::new();
        crop_resolution(&fake, &cfg, &path, 0, 0, 150).await.unwrap();

        assert_eq!(fs::read(&path).await.unwrap(), before, "no-op must not touch the file");
        assert_eq!(scratch_file_count(&cfg), 0);
    }

    #[tokio::test]
    async fn test_crop_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let cfg = test_cfg(&dir);
        let path = dir.path().join("clip.mp4");
        FakeTranscoder::seed(&path, FakeTranscoder::video_probe(150, 1920, 1080, 30.0))
            .await
            .unwrap();

        let fake = FakeTranscoder::new();
        crop_resolution(&fake, &cfg, &path, 10, 10, 150).await.unwrap();
        let first = fake.probe(&path).await.unwrap();
        assert_eq!(first.resolution(), cfg.resolution);

        // Second run short-circuits on the strict resolution match.
        let before = fs::read(&path).await.unwrap();
        crop_resolution(&fake, &cfg, &path, 10, 10, 150).await.unwrap();
        assert_eq!(fs::read(&path).await.unwrap(), before);
        assert_eq!(scratch_file_count(&cfg), 0);
    }

    #[tokio::test]
    async fn test_overproduced_frames_are_trimmed() {
        let dir = TempDir::new().unwrap();
        let cfg = test_cfg(&dir);
        let path = dir.path().join("clip.mp4");
        FakeTranscoder::seed(&path, FakeTranscoder::video_probe(150, 1920, 1080, 30.0))
            .await
            .unwrap();

        let fake = FakeTranscoder::new();
        fake.set_crop_frame_delta(7);
        crop_resolution(&fake, &cfg, &path, 0, 0, 150).await.unwrap();

        let result = fake.probe(&path).await.unwrap();
        assert_eq!(result.frame_count, 150);
        assert_eq!(result.resolution(), cfg.resolution);
        assert_eq!(scratch_file_count(&cfg), 0);
    }

    #[tokio::test]
    async fn test_underproduced_frames_are_integrity_fault() {
        let dir = TempDir::new().unwrap();
        let cfg = test_cfg(&dir);
        let path = dir.path().join("clip.mp4");
        FakeTranscoder::seed(&path, FakeTranscoder::video_probe(150, 1920, 1080, 30.0))
            .await
            .unwrap();

        let fake = FakeTranscoder::new();
        fake.set_crop_frame_delta(-3);
        let err = crop_resolution(&fake, &cfg, &path, 0, 0, 150).await.unwrap_err();

        assert!(matches!(err, MediaError::CropIntegrity { actual: 147, .. }));
        assert_eq!(scratch_file_count(&cfg), 0, "scratch cleaned on failure too");
    }

    #[tokio::test]
    async fn test_transcoder_fault_cleans_scratch() {
        let dir = TempDir::new().unwrap();
        let cfg = test_cfg(&dir);
        let path = dir.path().join("clip.mp4");
        FakeTranscoder::seed(&path, FakeTranscoder::video_probe(150, 1920, 1080, 30.0))
            .await
            .unwrap();

        let fake = FakeTranscoder::new();
        fake.fail_on(OpKind::Crop);
        let err = crop_resolution(&fake, &cfg, &path, 0, 0, 150).await.unwrap_err();

        assert!(matches!(err, MediaError::TranscoderFault { .. }));
        assert_eq!(scratch_file_count(&cfg), 0);
    }

    #[tokio::test]
    async fn test_image_crop_rewrites_in_place() {
        let dir = TempDir::new().unwrap();
        let cfg = test_cfg(&dir);
        let path = dir.path().join("still.png");
        FakeTranscoder::seed(&path, FakeTranscoder::video_probe(1, 1920, 1080, 30.0))
            .await
            .unwrap();

        let fake = FakeTranscoder::new();
        crop_image_resolution(&fake, &cfg, &path, 5, 5).await.unwrap();

        let result = fake.probe(&path).await.unwrap();
        assert_eq!(result.resolution(), cfg.resolution);
        assert_eq!(result.frame_count, 1);
        assert_eq!(scratch_file_count(&cfg), 0);
    }
}
