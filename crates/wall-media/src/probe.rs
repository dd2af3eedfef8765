//! FFprobe media inspection.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use wall_models::Resolution;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

/// Probed media file information. Ephemeral, recomputed on every call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaProbe {
    /// Duration in seconds
    pub duration: f64,
    /// Exact frame count
    pub frame_count: u64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
}

impl MediaProbe {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
    nb_read_frames: Option<String>,
    duration: Option<String>,
}

/// Probe a media file. Fails if the file cannot be inspected or the
/// stream metadata lacks a parseable frame count. No filesystem side
/// effects.
pub async fn probe(path: impl AsRef<Path>) -> MediaResult<MediaProbe> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffprobe()?;

    // -count_frames decodes the stream so nb_read_frames is exact even
    // for containers that omit nb_frames (notably GIF).
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
            "-count_frames",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::probe(format!(
            "ffprobe failed for {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    parse_probe_output(&output.stdout)
}

fn parse_probe_output(stdout: &[u8]) -> MediaResult<MediaProbe> {
    let parsed: FfprobeOutput = serde_json::from_slice(stdout)?;

    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| MediaError::probe("no video stream found"))?;

    let frame_count = stream
        .nb_read_frames
        .as_deref()
        .or(stream.nb_frames.as_deref())
        .and_then(|n| n.parse::<u64>().ok())
        .ok_or_else(|| MediaError::probe("stream metadata lacks a frame count"))?;

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .or(stream.r_frame_rate.as_deref())
        .and_then(parse_frame_rate)
        .ok_or_else(|| MediaError::probe("stream metadata lacks a frame rate"))?;

    let (width, height) = stream
        .width
        .zip(stream.height)
        .ok_or_else(|| MediaError::probe("stream metadata lacks a resolution"))?;

    let duration = parsed
        .format
        .duration
        .as_deref()
        .or(stream.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(MediaProbe {
        duration,
        frame_count,
        width,
        height,
        fps,
    })
}

/// Parse a frame rate string (e.g., "30/1" or "29.97").
pub fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("29.97").unwrap() - 29.97).abs() < 0.01);
        assert!(parse_frame_rate("30/0").is_none());
        assert!(parse_frame_rate("garbage").is_none());
    }

    #[test]
    fn test_parse_probe_output() {
        let json = br#"{
            "format": { "duration": "5.000000" },
            "streams": [
                { "codec_type": "audio" },
                {
                    "codec_type": "video",
                    "width": 854,
                    "height": 480,
                    "r_frame_rate": "30/1",
                    "avg_frame_rate": "30/1",
                    "nb_frames": "150"
                }
            ]
        }"#;

        let probe = parse_probe_output(json).unwrap();
        assert_eq!(probe.frame_count, 150);
        assert_eq!(probe.width, 854);
        assert_eq!(probe.height, 480);
        assert!((probe.fps - 30.0).abs() < 0.01);
        assert!((probe.duration - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_nb_read_frames_preferred() {
        let json = br#"{
            "format": {},
            "streams": [{
                "codec_type": "video",
                "width": 100, "height": 100,
                "avg_frame_rate": "30/1",
                "nb_frames": "140",
                "nb_read_frames": "150"
            }]
        }"#;
        assert_eq!(parse_probe_output(json).unwrap().frame_count, 150);
    }

    #[test]
    fn test_missing_frame_count_is_error() {
        let json = br#"{
            "format": { "duration": "5.0" },
            "streams": [{
                "codec_type": "video",
                "width": 854, "height": 480,
                "avg_frame_rate": "30/1"
            }]
        }"#;
        assert!(matches!(
            parse_probe_output(json),
            Err(MediaError::Probe(_))
        ));
    }

    #[test]
    fn test_missing_resolution_is_error() {
        let json = br#"{
            "format": { "duration": "5.0" },
            "streams": [{
                "codec_type": "video",
                "avg_frame_rate": "30/1",
                "nb_frames": "150"
            }]
        }"#;
        assert!(matches!(
            parse_probe_output(json),
            Err(MediaError::Probe(_))
        ));
    }

    #[test]
    fn test_missing_video_stream_is_error() {
        let json = br#"{ "format": {}, "streams": [{ "codec_type": "audio" }] }"#;
        assert!(parse_probe_output(json).is_err());
    }
}
