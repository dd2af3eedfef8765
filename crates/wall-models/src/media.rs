//! Media record identity and classification.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::show::ShowId;

/// Unique identifier for a stored media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct MediaId(pub Uuid);

impl MediaId {
    /// Generate a new random media ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MediaId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Broad class of an upload, derived from its declared mime type and
/// file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Gif,
    Image,
}

impl MediaKind {
    /// Classify an upload. GIFs are sniffed by extension because browsers
    /// commonly declare them as `image/gif`, yet they move through the
    /// video path.
    pub fn classify(mime: &str, extension: &str) -> Option<Self> {
        let extension = extension.to_ascii_lowercase();
        if extension == "gif" {
            Some(Self::Gif)
        } else if mime.starts_with("video/") {
            Some(Self::Video)
        } else if mime.starts_with("image/") {
            Some(Self::Image)
        } else {
            None
        }
    }

    /// Label used in user-facing diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Gif => "GIF",
            Self::Image => "Image",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A stored media item as the persistence layer sees it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MediaRecord {
    /// Unique media ID
    pub id: MediaId,

    /// Owning show
    pub show: ShowId,

    /// Display title
    pub title: String,

    /// Current path of the stored file
    pub file_path: PathBuf,

    /// Upload timestamp
    pub uploaded_at: DateTime<Utc>,
}

impl MediaRecord {
    /// Create a new record for a freshly stored upload.
    pub fn new(show: ShowId, title: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            id: MediaId::new(),
            show,
            title: title.into(),
            file_path: file_path.into(),
            uploaded_at: Utc::now(),
        }
    }
}
