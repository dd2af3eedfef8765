//! Pipeline configuration.
//!
//! An explicit value threaded into every pipeline call, never ambient
//! module state, so tests can exercise alternate targets without
//! process-wide mutation.

use std::path::PathBuf;

use crate::contract::{Resolution, FRAME_RATE, RESOLUTION, TIME_LIMIT_SECS, TRIM_MARGIN};

/// Preferred stored-video file extension.
pub const VIDEO_EXTENSION: &str = "mp4";
/// Preferred thumbnail image file extension.
pub const IMAGE_EXTENSION: &str = "jpeg";

/// Media normalization configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Output resolution for every stored video.
    pub resolution: Resolution,
    /// Output frame rate for every stored video.
    pub frame_rate: u32,
    /// Whether over-length uploads within the margin are trimmed.
    pub margin_on: bool,
    /// Trim margin in frames, applied only when `margin_on`.
    pub trim_margin: u32,
    /// Maximum accepted source duration in seconds.
    pub time_limit_secs: u32,
    /// Decimal places of frame-rate accuracy required at validation.
    pub frame_rate_decimals: u32,
    /// Stored-video extension.
    pub video_ext: String,
    /// Thumbnail extension.
    pub image_ext: String,
    /// Scratch directory for in-flight relocations.
    pub scratch_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resolution: RESOLUTION,
            frame_rate: FRAME_RATE,
            margin_on: true,
            trim_margin: TRIM_MARGIN,
            time_limit_secs: TIME_LIMIT_SECS,
            frame_rate_decimals: 1,
            video_ext: VIDEO_EXTENSION.to_string(),
            image_ext: IMAGE_EXTENSION.to_string(),
            scratch_dir: PathBuf::from("tmp"),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            margin_on: std::env::var("WALL_MARGIN_ON")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.margin_on),
            trim_margin: std::env::var("WALL_TRIM_MARGIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.trim_margin),
            time_limit_secs: std::env::var("WALL_TIME_LIMIT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.time_limit_secs),
            scratch_dir: std::env::var("WALL_SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_dir),
            ..defaults
        }
    }

    /// The effective frame margin: collapses to zero when trimming is
    /// disabled, making any overage a hard rejection.
    pub fn frame_margin(&self) -> u32 {
        if self.margin_on {
            self.trim_margin
        } else {
            0
        }
    }

    /// Returns a copy using `dir` as the scratch directory.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_margin() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.frame_margin(), 60);
    }

    #[test]
    fn test_margin_off_collapses_to_zero() {
        let cfg = PipelineConfig {
            margin_on: false,
            ..Default::default()
        };
        assert_eq!(cfg.frame_margin(), 0);
    }
}
