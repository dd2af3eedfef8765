//! Scratch-file relocation with guaranteed cleanup.
//!
//! Every destructive pipeline step first moves its source out of the way
//! into the scratch directory under a unique name, so a failed transcode
//! never corrupts the canonical path. The scratch copy is owned
//! exclusively by the operation that claimed it and must be gone by the
//! time the operation returns, on every exit path.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{MediaError, MediaResult};

/// A uniquely-named relocated file under the scratch directory.
///
/// Call [`ScratchFile::cleanup`] on controlled exit paths so deletion
/// failures surface; `Drop` is a best-effort backstop for early returns.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    released: bool,
}

impl ScratchFile {
    /// Move the file at `src` into `scratch_dir` under a fresh unique
    /// name, keeping the given extension. The source path is left vacant.
    pub async fn claim(src: &Path, scratch_dir: &Path, ext: &str) -> MediaResult<Self> {
        fs::create_dir_all(scratch_dir).await?;

        let path = scratch_dir.join(format!("tmpfile_{}.{}", Uuid::new_v4(), ext));
        move_file(src, &path).await?;
        debug!("Relocated {} -> {}", src.display(), path.display());

        Ok(Self {
            path,
            released: false,
        })
    }

    /// Path of the scratch copy.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the scratch copy. Already-absent counts as success; any
    /// other I/O failure is returned rather than hidden.
    pub async fn cleanup(mut self) -> MediaResult<()> {
        self.released = true;
        remove_if_exists(&self.path).await
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if !self.released && self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!("Failed to drop scratch file {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Delete `path` if it exists. Absence is not an error.
pub async fn remove_if_exists(path: &Path) -> MediaResult<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(MediaError::from(e)),
    }
}

/// Move a file, falling back to copy-and-delete when the rename crosses
/// filesystems (the scratch directory may not share a mount with the
/// media store).
async fn move_file(src: &Path, dst: &Path) -> MediaResult<()> {
    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_error(&e) => {
            debug!(
                "Cross-device rename, falling back to copy+delete: {} -> {}",
                src.display(),
                dst.display()
            );
            fs::copy(src, dst).await?;
            fs::remove_file(src).await?;
            Ok(())
        }
        Err(e) => Err(MediaError::from(e)),
    }
}

/// Check if an IO error is EXDEV (cross-device link).
fn is_cross_device_error(e: &std::io::Error) -> bool {
    // EXDEV is error code 18 on Linux/macOS
    e.raw_os_error() == Some(18)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_claim_vacates_source() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("upload.mp4");
        fs::write(&src, b"payload").await.unwrap();

        let scratch = ScratchFile::claim(&src, &dir.path().join("tmp"), "mp4")
            .await
            .unwrap();

        assert!(!src.exists(), "source should be vacated");
        assert!(scratch.path().exists());
        assert_eq!(scratch.path().extension().unwrap(), "mp4");

        scratch.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_cleanup_removes_file() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("upload.mp4");
        fs::write(&src, b"payload").await.unwrap();

        let scratch = ScratchFile::claim(&src, &dir.path().join("tmp"), "mp4")
            .await
            .unwrap();
        let path = scratch.path().to_path_buf();

        scratch.cleanup().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_cleanup_absent_is_ok() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("upload.mp4");
        fs::write(&src, b"payload").await.unwrap();

        let scratch = ScratchFile::claim(&src, &dir.path().join("tmp"), "mp4")
            .await
            .unwrap();
        fs::remove_file(scratch.path()).await.unwrap();

        scratch.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_drop_backstop_removes_file() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("upload.mp4");
        fs::write(&src, b"payload").await.unwrap();

        let path = {
            let scratch = ScratchFile::claim(&src, &dir.path().join("tmp"), "mp4")
                .await
                .unwrap();
            scratch.path().to_path_buf()
        };

        assert!(!path.exists(), "drop should remove unclaimed scratch file");
    }

    #[tokio::test]
    async fn test_unique_names_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.mp4");
        let b = dir.path().join("b.mp4");
        fs::write(&a, b"a").await.unwrap();
        fs::write(&b, b"b").await.unwrap();

        let sa = ScratchFile::claim(&a, &dir.path().join("tmp"), "mp4").await.unwrap();
        let sb = ScratchFile::claim(&b, &dir.path().join("tmp"), "mp4").await.unwrap();
        assert_ne!(sa.path(), sb.path());

        sa.cleanup().await.unwrap();
        sb.cleanup().await.unwrap();
    }
}
