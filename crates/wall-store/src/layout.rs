//! On-disk layout of a show's media tree.
//!
//! Every path the pipeline touches is derived here, so the directory
//! scheme lives in exactly one place:
//!
//! ```text
//! {root}/shows/{show_id}/
//!     videos/              uploaded and normalized media files
//!     thumbnails/{media_id}/{frame}.jpeg
//!     blank.mp4            black filler for unassigned bricks
//!     cover_image.{ext}
//! ```

use std::path::{Path, PathBuf};

use wall_models::{MediaId, ShowId};

/// Path derivation for one media root.
#[derive(Debug, Clone)]
pub struct ShowLayout {
    root: PathBuf,
}

impl ShowLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding everything owned by one show.
    pub fn show_dir(&self, show: ShowId) -> PathBuf {
        self.root.join("shows").join(show.0.to_string())
    }

    /// Directory for the show's media files.
    pub fn videos_dir(&self, show: ShowId) -> PathBuf {
        self.show_dir(show).join("videos")
    }

    /// Cache directory for one media item's frame thumbnails. Removed
    /// wholesale when the media is discarded.
    pub fn thumbnails_dir(&self, show: ShowId, media: MediaId) -> PathBuf {
        self.show_dir(show).join("thumbnails").join(media.to_string())
    }

    /// The show's black filler video, regenerated on frame-count change.
    pub fn blank_video_path(&self, show: ShowId) -> PathBuf {
        self.show_dir(show).join("blank.mp4")
    }

    pub fn cover_image_path(&self, show: ShowId, ext: &str) -> PathBuf {
        self.show_dir(show).join(format!("cover_image.{ext}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_nest_under_show_dir() {
        let layout = ShowLayout::new("/media");
        let show = ShowId(7);
        let media = MediaId::new();

        assert_eq!(layout.show_dir(show), PathBuf::from("/media/shows/7"));
        assert_eq!(layout.videos_dir(show), PathBuf::from("/media/shows/7/videos"));
        assert_eq!(
            layout.thumbnails_dir(show, media),
            PathBuf::from(format!("/media/shows/7/thumbnails/{media}"))
        );
        assert_eq!(layout.blank_video_path(show), PathBuf::from("/media/shows/7/blank.mp4"));
        assert_eq!(
            layout.cover_image_path(show, "jpeg"),
            PathBuf::from("/media/shows/7/cover_image.jpeg")
        );
    }
}
