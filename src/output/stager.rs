//! Output directory lifecycle: create, purge and list

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{SliceError, SliceResult};
use crate::output::OutputListing;
use crate::utils::path::PathUtils;

/// Manages the directory receiving split segments
#[derive(Debug, Clone)]
pub struct OutputStager {
    directory: PathBuf,
    extension: String,
}

impl OutputStager {
    /// Create a stager for `directory`, listing files with `extension`
    pub fn new(directory: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            extension: extension.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Create the output directory if it does not exist
    pub async fn ensure_directory(&self) -> SliceResult<()> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| SliceError::filesystem(&self.directory, e))?;
        debug!("Output directory ready: {}", self.directory.display());
        Ok(())
    }

    /// Remove the output directory and everything in it.
    ///
    /// A missing directory is not an error. Other failures are logged and
    /// the run carries on.
    pub async fn purge(&self) {
        match tokio::fs::remove_dir_all(&self.directory).await {
            Ok(()) => info!("Purged output directory {}", self.directory.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Nothing to purge at {}", self.directory.display());
            }
            Err(e) => warn!(
                "Failed to purge output directory {}: {}",
                self.directory.display(),
                e
            ),
        }
    }

    /// Media files directly inside the output directory, natural-sorted.
    ///
    /// A missing or unreadable directory yields an empty listing.
    pub async fn list(&self) -> OutputListing {
        let directory = self.directory.clone();
        let extension = self.extension.clone();

        let listed = tokio::task::spawn_blocking(move || Self::scan(&directory, &extension)).await;
        match listed {
            Ok(listing) => listing,
            Err(e) => {
                warn!("Output listing task failed: {}", e);
                OutputListing::default()
            }
        }
    }

    fn scan(directory: &Path, extension: &str) -> OutputListing {
        if !directory.is_dir() {
            return OutputListing::default();
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(directory).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to read output directory {}: {}", directory.display(), e);
                    return OutputListing::default();
                }
            };
            // Only regular files are listed
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if PathUtils::has_extension(&name, extension) {
                files.push(name);
            }
        }

        PathUtils::natural_sort(&mut files);
        OutputListing::new(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    #[tokio::test]
    async fn test_list_is_natural_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        for name in ["clip10.mp4", "clip2.mp4", "clip1.mp4", "notes.txt", "clip3.MP4"] {
            touch(temp.path(), name);
        }
        std::fs::create_dir(temp.path().join("nested")).unwrap();
        touch(&temp.path().join("nested"), "clip0.mp4");

        let listing = OutputStager::new(temp.path(), "mp4").list().await;
        assert_eq!(
            listing.files,
            vec!["clip1.mp4", "clip2.mp4", "clip3.MP4", "clip10.mp4"]
        );
    }

    #[tokio::test]
    async fn test_missing_directory_lists_empty() {
        let temp = TempDir::new().unwrap();
        let stager = OutputStager::new(temp.path().join("absent"), "mp4");
        assert!(stager.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_purge_then_ensure_leaves_empty_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("split-videos");
        let stager = OutputStager::new(&dir, "mp4");

        stager.purge().await;
        stager.ensure_directory().await.unwrap();
        touch(&dir, "old000.mp4");
        assert_eq!(stager.list().await.len(), 1);

        stager.purge().await;
        assert!(!dir.exists());
        stager.ensure_directory().await.unwrap();
        stager.ensure_directory().await.unwrap();
        assert!(dir.is_dir());
        assert!(stager.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_ensure_directory_failure_is_fatal() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        touch(temp.path(), "file");

        let err = OutputStager::new(blocker.join("out"), "mp4")
            .ensure_directory()
            .await
            .unwrap_err();
        assert!(matches!(err, SliceError::Filesystem { .. }));
    }
}
