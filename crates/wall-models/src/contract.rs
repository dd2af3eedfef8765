//! The playback contract enforced on every stored video.
//!
//! The wall's playback hardware tolerates no variance: a stored file must
//! land on the exact resolution, frame rate, and frame count below, or the
//! bricks drift out of sync.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wall playback resolution (width, height). 480p, 16:9.
pub const RESOLUTION: Resolution = Resolution {
    width: 854,
    height: 480,
};

/// Wall playback frame rate in frames per second.
pub const FRAME_RATE: u32 = 30;

/// Longer uploads (but by fewer than this many frames) are trimmed
/// instead of rejected.
pub const TRIM_MARGIN: u32 = 60;

/// Upload duration cap in seconds (5 minutes).
pub const TIME_LIMIT_SECS: u32 = 5 * 60;

/// A pixel resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Exact half on both axes, used for preview thumbnails.
    pub fn halved(self) -> Self {
        Self {
            width: self.width / 2,
            height: self.height / 2,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The playback target a show imposes on every media item attached to it.
///
/// `frame_count` is owned by the show record and may be edited, but any
/// change invalidates all previously normalized media for that show (the
/// store layer purges them rather than re-cropping).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlaybackContract {
    /// Exact frame count every stored video must have.
    pub frame_count: u32,
    /// Exact frame rate, system-wide constant.
    pub frame_rate: u32,
    /// Exact output resolution, system-wide constant.
    pub resolution: Resolution,
    /// Maximum accepted source duration in seconds.
    pub time_limit_secs: u32,
}

impl PlaybackContract {
    /// Contract for a show with the given frame count and system defaults
    /// for everything else.
    pub fn for_frame_count(frame_count: u32) -> Self {
        Self {
            frame_count,
            frame_rate: FRAME_RATE,
            resolution: RESOLUTION,
            time_limit_secs: TIME_LIMIT_SECS,
        }
    }

    /// Target duration in seconds (`frame_count / frame_rate`).
    pub fn duration_secs(&self) -> f64 {
        f64::from(self.frame_count) / f64::from(self.frame_rate)
    }

    /// Largest frame count a show may be configured with.
    pub fn max_frame_count() -> u32 {
        FRAME_RATE * TIME_LIMIT_SECS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_from_frame_count() {
        let contract = PlaybackContract::for_frame_count(150);
        assert!((contract.duration_secs() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_halved_resolution() {
        let half = RESOLUTION.halved();
        assert_eq!(half.width, 427);
        assert_eq!(half.height, 240);
    }

    #[test]
    fn test_max_frame_count() {
        assert_eq!(PlaybackContract::max_frame_count(), 9000);
    }
}
