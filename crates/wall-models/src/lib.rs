//! Shared data models for the brick-wall backend.
//!
//! This crate provides Serde-serializable types for:
//! - The playback contract every stored video must satisfy
//! - Pipeline and encoding configuration
//! - Media classification (video / GIF / still image)
//! - Show and media record identities

pub mod config;
pub mod contract;
pub mod encoding;
pub mod media;
pub mod show;

// Re-export common types
pub use config::PipelineConfig;
pub use contract::{PlaybackContract, Resolution, FRAME_RATE, RESOLUTION, TIME_LIMIT_SECS, TRIM_MARGIN};
pub use encoding::EncodingConfig;
pub use media::{MediaId, MediaKind, MediaRecord};
pub use show::{ShowId, ShowStatus};
