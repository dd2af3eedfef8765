//! On-demand frame extraction for previews.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use wall_models::PipelineConfig;

use crate::error::MediaResult;
use crate::transcoder::{TranscodeOp, Transcoder};

/// JPEG quality for cached preview thumbnails. Previews render at brick
/// scale, so aggressive compression is acceptable.
const THUMBNAIL_JPEG_QUALITY: u8 = 60;

/// Extract the frame at `frame_number` from an already-conformant video,
/// downscaled to half the contract resolution and JPEG-encoded.
///
/// Thumbnails are cached under `cache_dir` keyed by frame index; a hit
/// returns the cached bytes unchanged. Cache writes are idempotent (the
/// content is deterministic for a conformant input, so racing requests
/// for the same frame are safe). The source video is never mutated.
pub async fn extract_frame(
    transcoder: &dyn Transcoder,
    cfg: &PipelineConfig,
    video_path: &Path,
    frame_number: u64,
    cache_dir: &Path,
) -> MediaResult<Vec<u8>> {
    let cache_path = cache_dir.join(format!("{}.{}", frame_number, cfg.image_ext));
    if cache_path.exists() {
        debug!("Thumbnail cache hit for frame {}", frame_number);
        return Ok(fs::read(&cache_path).await?);
    }

    fs::create_dir_all(cache_dir).await?;

    let fps = transcoder.probe(video_path).await?.fps;
    let timestamp_secs = frame_number as f64 / fps;

    // Decode the frame at full resolution, then rasterize down in-process.
    let workdir = tempfile::tempdir()?;
    let raw_path = workdir.path().join("frame.png");
    transcoder
        .transcode(video_path, &raw_path, &TranscodeOp::ExtractFrame { timestamp_secs })
        .await?;

    let half = cfg.resolution.halved();
    let thumb = image::open(&raw_path)?
        .resize_exact(half.width, half.height, FilterType::Triangle)
        .to_rgb8();

    let mut encoded = Vec::new();
    thumb.write_with_encoder(JpegEncoder::new_with_quality(
        &mut encoded,
        THUMBNAIL_JPEG_QUALITY,
    ))?;

    // Last writer wins; the bytes are identical either way.
    fs::write(&cache_path, &encoded).await?;

    info!(
        "Cached thumbnail for frame {} of {}",
        frame_number,
        video_path.display()
    );
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTranscoder;
    use tempfile::TempDir;
    use wall_models::Resolution;

    #[tokio::test]
    async fn test_extract_caches_and_returns_half_resolution_jpeg() {
        let dir = TempDir::new().unwrap();
        let mut cfg = PipelineConfig::default().with_scratch_dir(dir.path().join("tmp"));
        cfg.resolution = Resolution::new(64, 48);

        let video = dir.path().join("clip.mp4");
        FakeTranscoder::seed(&video, FakeTranscoder::video_probe(150, 64, 48, 30.0))
            .await
            .unwrap();

        let cache_dir = dir.path().join("thumbnails");
        let fake = FakeTranscoder::new();
        let bytes = extract_frame(&fake, &cfg, &video, 42, &cache_dir).await.unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 32);
        assert_eq!(decoded.height(), 24);
        assert!(cache_dir.join("42.jpeg").exists());
    }

    #[tokio::test]
    async fn test_cache_hit_returns_bytes_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut cfg = PipelineConfig::default().with_scratch_dir(dir.path().join("tmp"));
        cfg.resolution = Resolution::new(64, 48);

        let video = dir.path().join("clip.mp4");
        FakeTranscoder::seed(&video, FakeTranscoder::video_probe(150, 64, 48, 30.0))
            .await
            .unwrap();

        let cache_dir = dir.path().join("thumbnails");
        let fake = FakeTranscoder::new();
        let first = extract_frame(&fake, &cfg, &video, 7, &cache_dir).await.unwrap();

        // Poison the cache entry to prove the second call reads it back
        // instead of re-extracting.
        tokio::fs::write(cache_dir.join("7.jpeg"), b"sentinel").await.unwrap();
        let second = extract_frame(&fake, &cfg, &video, 7, &cache_dir).await.unwrap();
        assert_eq!(second, b"sentinel");
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_source_video_is_never_mutated() {
        let dir = TempDir::new().unwrap();
        let mut cfg = PipelineConfig::default().with_scratch_dir(dir.path().join("tmp"));
        cfg.resolution = Resolution::new(64, 48);

        let video = dir.path().join("clip.mp4");
        FakeTranscoder::seed(&video, FakeTranscoder::video_probe(150, 64, 48, 30.0))
            .await
            .unwrap();
        let before = tokio::fs::read(&video).await.unwrap();

        let fake = FakeTranscoder::new();
        extract_frame(&fake, &cfg, &video, 0, &dir.path().join("thumbs"))
            .await
            .unwrap();

        assert_eq!(tokio::fs::read(&video).await.unwrap(), before);
    }
}
