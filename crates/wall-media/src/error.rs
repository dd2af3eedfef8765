//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media normalization.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("Could not read media metadata: {0}")]
    Probe(String),

    #[error("Media frame count ({actual}) > needed frame count ({required})")]
    TooLong { actual: u64, required: u64 },

    #[error("Media frame count ({actual}) < needed frame count ({required})")]
    TooShort { actual: u64, required: u64 },

    #[error("{media} is too long. Maximum allowed duration is {limit_secs} seconds")]
    DurationTooLong { media: &'static str, limit_secs: u32 },

    #[error("{media} resolution is too small. Must be at least {required_width} x {required_height}")]
    ResolutionTooSmall {
        media: &'static str,
        required_width: u32,
        required_height: u32,
    },

    #[error("{media} framerate must be {required}fps")]
    FrameRateMismatch { media: &'static str, required: u32 },

    #[error("Video could not successfully crop to {width}x{height}: got {actual} frames, expected at least {expected}")]
    CropIntegrity {
        width: u32,
        height: u32,
        actual: u64,
        expected: u64,
    },

    #[error("{media} could not successfully crop to {expected} frames, got {actual} frames instead")]
    TrimIntegrity {
        media: &'static str,
        expected: u64,
        actual: u64,
    },

    #[error("Converted video landed on {actual} frames, expected {expected}")]
    ConvertIntegrity { expected: u64, actual: u64 },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Transcoder failed: {message}")]
    TranscoderFault {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),
}

impl MediaError {
    /// Create a transcoder failure error.
    pub fn transcoder_fault(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::TranscoderFault {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a probe failure error.
    pub fn probe(message: impl Into<String>) -> Self {
        Self::Probe(message.into())
    }

    /// Whether the error is a user-correctable rejection (the upload was
    /// bad) rather than an internal fault. Rejections are surfaced with
    /// their full message; faults are logged in detail and surfaced as an
    /// opaque processing failure.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::TooLong { .. }
                | Self::TooShort { .. }
                | Self::DurationTooLong { .. }
                | Self::ResolutionTooSmall { .. }
                | Self::FrameRateMismatch { .. }
                | Self::UnsupportedFormat(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_error_message_names_relation() {
        let err = MediaError::TooLong {
            actual: 220,
            required: 150,
        };
        let msg = err.to_string();
        assert!(msg.contains("220"));
        assert!(msg.contains("150"));
        assert!(msg.contains('>'));

        let err = MediaError::TooShort {
            actual: 50,
            required: 150,
        };
        assert!(err.to_string().contains('<'));
    }

    #[test]
    fn test_user_error_classification() {
        assert!(MediaError::TooShort {
            actual: 1,
            required: 2
        }
        .is_user_error());
        assert!(MediaError::UnsupportedFormat("pdf".into()).is_user_error());
        assert!(!MediaError::TrimIntegrity {
            media: "Video",
            expected: 150,
            actual: 149
        }
        .is_user_error());
        assert!(!MediaError::transcoder_fault("boom", None, Some(1)).is_user_error());
    }
}
