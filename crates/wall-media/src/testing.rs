//! Scripted fake transcoder for pipeline tests.
//!
//! The fake stores each file's probe metadata as JSON inside the file
//! itself, so scratch relocations (real renames on disk) carry the
//! metadata along with the bytes. `transcode` rewrites the metadata the
//! way the real tool would change the media, without invoking any binary.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;

use crate::error::{MediaError, MediaResult};
use crate::probe::MediaProbe;
use crate::transcoder::{TranscodeOp, Transcoder};

/// Which operation kind a scripted failure should hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Crop,
    CropImage,
    Trim,
    LoopImage,
    PadClone,
    ExtractFrame,
}

impl OpKind {
    fn of(op: &TranscodeOp) -> Self {
        match op {
            TranscodeOp::Crop { .. } => Self::Crop,
            TranscodeOp::CropImage { .. } => Self::CropImage,
            TranscodeOp::Trim { .. } => Self::Trim,
            TranscodeOp::LoopImage { .. } => Self::LoopImage,
            TranscodeOp::PadClone { .. } => Self::PadClone,
            TranscodeOp::ExtractFrame { .. } => Self::ExtractFrame,
        }
    }
}

#[derive(Debug, Default)]
struct Knobs {
    /// Fail any operation of this kind with a transcoder fault.
    fail_on: Option<OpKind>,
    /// Frames the crop re-encode adds (or, negative, loses) vs the input.
    crop_frame_delta: i64,
    /// Frames a trim misses the request by.
    trim_offset: i64,
    /// Override the frame count a loop-image produces.
    loop_frames: Option<u64>,
}

/// A [`Transcoder`] whose outputs are scripted, for tests that must not
/// shell out.
#[derive(Debug, Default)]
pub struct FakeTranscoder {
    knobs: Mutex<Knobs>,
}

impl FakeTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a fake media file at `path` described by `probe`.
    pub async fn seed(path: &Path, probe: MediaProbe) -> MediaResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, serde_json::to_vec(&probe)?).await?;
        Ok(())
    }

    /// Convenience: a conformant-looking video probe.
    pub fn video_probe(frame_count: u64, width: u32, height: u32, fps: f64) -> MediaProbe {
        MediaProbe {
            duration: frame_count as f64 / fps,
            frame_count,
            width,
            height,
            fps,
        }
    }

    /// Fail every operation of the given kind until cleared.
    pub fn fail_on(&self, kind: OpKind) {
        self.knobs.lock().unwrap().fail_on = Some(kind);
    }

    /// Make crops over- or under-produce frames relative to their input.
    pub fn set_crop_frame_delta(&self, delta: i64) {
        self.knobs.lock().unwrap().crop_frame_delta = delta;
    }

    /// Make trims miss the requested frame count by `offset`.
    pub fn set_trim_offset(&self, offset: i64) {
        self.knobs.lock().unwrap().trim_offset = offset;
    }

    /// Script the frame count a loop-image conversion produces.
    pub fn set_loop_frames(&self, frames: u64) {
        self.knobs.lock().unwrap().loop_frames = Some(frames);
    }

    async fn read_probe(path: &Path) -> MediaResult<MediaProbe> {
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }
        let bytes = tokio::fs::read(path).await?;
        serde_json::from_slice(&bytes)
            .map_err(|_| MediaError::probe(format!("unreadable fake media: {}", path.display())))
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn probe(&self, path: &Path) -> MediaResult<MediaProbe> {
        Self::read_probe(path).await
    }

    async fn transcode(&self, input: &Path, output: &Path, op: &TranscodeOp) -> MediaResult<()> {
        let source = Self::read_probe(input).await?;

        let knobs = {
            let k = self.knobs.lock().unwrap();
            (k.fail_on, k.crop_frame_delta, k.trim_offset, k.loop_frames)
        };
        let (fail_on, crop_frame_delta, trim_offset, loop_frames) = knobs;

        // Output is written only on success, like the real tool.
        if fail_on == Some(OpKind::of(op)) {
            return Err(MediaError::transcoder_fault(
                "scripted transcoder failure",
                Some("fake stderr".to_string()),
                Some(1),
            ));
        }

        let result = match *op {
            TranscodeOp::Crop { width, height, .. } => MediaProbe {
                width,
                height,
                frame_count: source.frame_count.saturating_add_signed(crop_frame_delta),
                ..source
            },
            TranscodeOp::CropImage { width, height, .. } => MediaProbe {
                width,
                height,
                frame_count: 1,
                ..source
            },
            TranscodeOp::Trim { end_frame } => MediaProbe {
                frame_count: end_frame.saturating_add_signed(trim_offset),
                duration: end_frame as f64 / source.fps,
                ..source
            },
            TranscodeOp::LoopImage { duration_secs, fps } => {
                let frame_count =
                    loop_frames.unwrap_or_else(|| (duration_secs * f64::from(fps)).round() as u64);
                MediaProbe {
                    frame_count,
                    duration: frame_count as f64 / f64::from(fps),
                    fps: f64::from(fps),
                    ..source
                }
            }
            TranscodeOp::PadClone { stop_duration_secs } => {
                let added = (stop_duration_secs * source.fps).round() as u64;
                MediaProbe {
                    frame_count: source.frame_count + added,
                    duration: source.duration + stop_duration_secs,
                    ..source
                }
            }
            TranscodeOp::ExtractFrame { .. } => {
                // The extractor decodes this output with the image crate,
                // so emit a real PNG at the source resolution.
                let frame = image::RgbImage::new(source.width, source.height);
                frame
                    .save(output)
                    .map_err(|e| MediaError::probe(e.to_string()))?;
                return Ok(());
            }
        };

        Self::seed(output, result).await
    }
}
