//! Upload admission checks.
//!
//! Read-only: a rejected upload is byte-identical to what the caller
//! stored. All mutation happens later, in the normalization states.

use std::path::Path;
use tracing::debug;

use wall_media::{classify_length, meets_resolution, LengthClass, MediaError, Transcoder};
use wall_models::{MediaKind, PipelineConfig, PlaybackContract};

use crate::error::IngestResult;

/// Check the upload at `path` against the show's playback contract.
/// Returns the probe so callers need not re-run ffprobe.
///
/// Videos and GIFs are gated on duration, resolution, frame rate, and
/// frame count; a frame count over the target but under the trim margin
/// passes (the trimmer repairs it). Still images only need enough pixels,
/// since conversion manufactures the temporal dimension from scratch.
pub async fn validate_upload(
    transcoder: &dyn Transcoder,
    cfg: &PipelineConfig,
    path: &Path,
    kind: MediaKind,
    contract: &PlaybackContract,
) -> IngestResult<wall_media::MediaProbe> {
    let probe = transcoder.probe(path).await?;
    debug!(
        "Validating {} {}: {} frames, {}x{} @ {:.3}fps, {:.2}s",
        kind,
        path.display(),
        probe.frame_count,
        probe.width,
        probe.height,
        probe.fps,
        probe.duration
    );

    if !meets_resolution(probe.resolution(), cfg.resolution, false) {
        return Err(MediaError::ResolutionTooSmall {
            media: kind.label(),
            required_width: cfg.resolution.width,
            required_height: cfg.resolution.height,
        }
        .into());
    }

    if kind == MediaKind::Image {
        return Ok(probe);
    }

    if probe.duration > f64::from(cfg.time_limit_secs) {
        return Err(MediaError::DurationTooLong {
            media: kind.label(),
            limit_secs: cfg.time_limit_secs,
        }
        .into());
    }

    if round_to(probe.fps, cfg.frame_rate_decimals) != f64::from(cfg.frame_rate) {
        return Err(MediaError::FrameRateMismatch {
            media: kind.label(),
            required: cfg.frame_rate,
        }
        .into());
    }

    let required = u64::from(contract.frame_count);
    match classify_length(probe.frame_count, required, u64::from(cfg.frame_margin())) {
        LengthClass::Exact | LengthClass::TrimNeeded => Ok(probe),
        LengthClass::TooLong => Err(MediaError::TooLong {
            actual: probe.frame_count,
            required,
        }
        .into()),
        LengthClass::TooShort => Err(MediaError::TooShort {
            actual: probe.frame_count,
            required,
        }
        .into()),
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
