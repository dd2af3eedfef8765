//! The narrow capability boundary to the external transcoding tools.
//!
//! Pipeline logic never shells out directly; it goes through [`Transcoder`]
//! so unit tests can substitute a scripted fake (see `testing`).

use async_trait::async_trait;
use std::path::Path;

use wall_models::EncodingConfig;

use crate::command::{run_ffmpeg, FfmpegCommand};
use crate::error::MediaResult;
use crate::probe::{self, MediaProbe};

/// A single transcoding operation, expressed as a filtergraph.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscodeOp {
    /// Crop a fixed-size window out of a video at the given offset.
    Crop { x: u32, y: u32, width: u32, height: u32 },
    /// Crop a still image (image2 output, full-range pixel format).
    CropImage { x: u32, y: u32, width: u32, height: u32 },
    /// Keep only frames `[0, end_frame)`.
    Trim { end_frame: u64 },
    /// Loop a still image into a video of the given duration.
    LoopImage { duration_secs: f64, fps: u32 },
    /// Extend a video by cloning its final frame for a duration.
    PadClone { stop_duration_secs: f64 },
    /// Decode the single frame nearest the timestamp.
    ExtractFrame { timestamp_secs: f64 },
}

/// Capability interface over the external probe/transcode tools.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Inspect a media file. Pure query, no side effects.
    async fn probe(&self, path: &Path) -> MediaResult<MediaProbe>;

    /// Run one operation from `input` to `output`. The output file is
    /// written only on success.
    async fn transcode(&self, input: &Path, output: &Path, op: &TranscodeOp) -> MediaResult<()>;
}

/// The real implementation, shelling out to ffmpeg/ffprobe.
#[derive(Debug, Clone, Default)]
pub struct FfmpegTranscoder {
    encoding: EncodingConfig,
}

impl FfmpegTranscoder {
    pub fn new(encoding: EncodingConfig) -> Self {
        Self { encoding }
    }

    fn build_command(&self, input: &Path, output: &Path, op: &TranscodeOp) -> FfmpegCommand {
        let cmd = FfmpegCommand::new(input, output);
        match *op {
            TranscodeOp::Crop { x, y, width, height } => cmd
                .video_filter(format!("crop={}:{}:{}:{}", width, height, x, y))
                .output_args(self.encoding.to_ffmpeg_args()),
            TranscodeOp::CropImage { x, y, width, height } => cmd
                .video_filter(format!("crop={}:{}:{}:{}", width, height, x, y))
                .output_args(["-f", "image2", "-pix_fmt", wall_models::encoding::IMAGE_PIXEL_FORMAT]),
            // No codec forced: the muxer inferred from the output
            // extension keeps GIF trims as GIF and MP4 trims as MP4.
            TranscodeOp::Trim { end_frame } => {
                cmd.video_filter(format!("trim=start_frame=0:end_frame={}", end_frame))
            }
            TranscodeOp::LoopImage { duration_secs, fps } => cmd
                .input_arg("-loop")
                .input_arg("1")
                .duration(duration_secs)
                .frame_rate(fps)
                .output_args(self.encoding.to_ffmpeg_args())
                .output_arg("-shortest"),
            TranscodeOp::PadClone { stop_duration_secs } => cmd
                .video_filter(format!(
                    "tpad=stop_mode=clone:stop_duration={:.3}",
                    stop_duration_secs
                ))
                .output_args(self.encoding.to_ffmpeg_args()),
            TranscodeOp::ExtractFrame { timestamp_secs } => cmd.seek(timestamp_secs).single_frame(),
        }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn probe(&self, path: &Path) -> MediaResult<MediaProbe> {
        probe::probe(path).await
    }

    async fn transcode(&self, input: &Path, output: &Path, op: &TranscodeOp) -> MediaResult<()> {
        run_ffmpeg(&self.build_command(input, output, op)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_for(op: TranscodeOp) -> Vec<String> {
        FfmpegTranscoder::default()
            .build_command(Path::new("in.mp4"), Path::new("out.mp4"), &op)
            .build_args()
    }

    #[test]
    fn test_crop_op_args() {
        let args = args_for(TranscodeOp::Crop {
            x: 10,
            y: 20,
            width: 854,
            height: 480,
        });
        assert!(args.contains(&"crop=854:480:10:20".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"yuv420p".to_string()));
    }

    #[test]
    fn test_trim_op_has_no_codec() {
        let args = args_for(TranscodeOp::Trim { end_frame: 150 });
        assert!(args.contains(&"trim=start_frame=0:end_frame=150".to_string()));
        assert!(!args.contains(&"-c:v".to_string()));
    }

    #[test]
    fn test_loop_image_args() {
        let args = args_for(TranscodeOp::LoopImage {
            duration_secs: 5.0,
            fps: 30,
        });
        let loop_pos = args.iter().position(|a| a == "-loop").unwrap();
        let i_pos = args.iter().position(|a| a == "-i").unwrap();
        assert!(loop_pos < i_pos);
        assert!(args.contains(&"-shortest".to_string()));
        assert!(args.contains(&"30".to_string()));
    }

    #[test]
    fn test_pad_clone_args() {
        let args = args_for(TranscodeOp::PadClone {
            stop_duration_secs: 0.333,
        });
        assert!(args.contains(&"tpad=stop_mode=clone:stop_duration=0.333".to_string()));
    }

    #[test]
    fn test_image_crop_pixel_format() {
        let args = args_for(TranscodeOp::CropImage {
            x: 0,
            y: 0,
            width: 854,
            height: 480,
        });
        assert!(args.contains(&"yuvj420p".to_string()));
        assert!(args.contains(&"image2".to_string()));
    }
}
