//! Media normalization pipeline for the brick wall.
//!
//! This crate provides:
//! - FFprobe/FFmpeg wrappers behind a narrow [`Transcoder`] capability trait
//! - Frame-count and resolution gates with exacting tolerances
//! - Spatial cropping, temporal trimming, and image-to-video conversion,
//!   all with guaranteed scratch-file cleanup on every exit path
//! - On-demand frame extraction with a disk-backed thumbnail cache
//! - Blank placeholder video generation

pub mod blank;
pub mod command;
pub mod convert;
pub mod error;
pub mod extract;
pub mod gates;
pub mod probe;
pub mod scratch;
pub mod spatial;
pub mod temporal;
pub mod transcoder;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use blank::generate_blank_video;
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand};
pub use convert::image_to_video;
pub use error::{MediaError, MediaResult};
pub use extract::extract_frame;
pub use gates::{classify_length, meets_resolution, LengthClass};
pub use probe::{probe, MediaProbe};
pub use scratch::{remove_if_exists, ScratchFile};
pub use spatial::{crop_image_resolution, crop_resolution, crop_to_path};
pub use temporal::crop_duration;
pub use transcoder::{FfmpegTranscoder, TranscodeOp, Transcoder};
