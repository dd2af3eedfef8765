//! Blank placeholder video generation.
//!
//! Bricks without an assigned video play a black placeholder of the
//! show's exact length, so the wall stays frame-locked everywhere.

use std::path::Path;
use tokio::fs;
use tracing::info;

use wall_models::{EncodingConfig, PipelineConfig};

use crate::command::{run_ffmpeg, FfmpegCommand};
use crate::error::MediaResult;

/// Generate a black video at `out_path` with exactly `frame_count` frames
/// at the configured resolution and frame rate.
pub async fn generate_blank_video(
    cfg: &PipelineConfig,
    encoding: &EncodingConfig,
    out_path: &Path,
    frame_count: u32,
) -> MediaResult<()> {
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let duration = f64::from(frame_count) / f64::from(cfg.frame_rate);
    let source = format!(
        "color=c=black:s={}x{}:r={}",
        cfg.resolution.width, cfg.resolution.height, cfg.frame_rate
    );

    let cmd = FfmpegCommand::from_lavfi(source, out_path)
        .duration(duration)
        .output_args(encoding.to_ffmpeg_args());
    run_ffmpeg(&cmd).await?;

    info!(
        "Generated blank video {} ({} frames)",
        out_path.display(),
        frame_count
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lavfi_color_source() {
        let cfg = PipelineConfig::default();
        let source = format!(
            "color=c=black:s={}x{}:r={}",
            cfg.resolution.width, cfg.resolution.height, cfg.frame_rate
        );
        assert_eq!(source, "color=c=black:s=854x480:r=30");
    }
}
