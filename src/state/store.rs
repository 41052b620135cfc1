use chrono::{DateTime, Local};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::data::PhotoPath;
use crate::error::{GalleryError, Result};

/// Extension given to every captured file
pub const CAPTURE_SUFFIX: &str = ".jpg";

/// The PhotoStore is the app-private pictures directory.
///
/// It is the only persistent state of the application: the photo list is
/// whatever the directory contains, and captures are new files in it.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        PhotoStore { dir: dir.into() }
    }

    /// Get the path of the pictures directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List every file in the pictures directory, in the order the
    /// filesystem returns them. A missing directory is an empty gallery.
    /// Symlinks to files count as files and keep their link path.
    pub fn list(&self) -> Vec<PhotoPath> {
        if !self.dir.exists() {
            tracing::info!(dir = %self.dir.display(), "pictures directory does not exist yet");
            return Vec::new();
        }

        WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| PhotoPath::from(entry.path()))
            .collect()
    }

    /// Create a new, empty, uniquely named capture target.
    ///
    /// The name is `JPEG_<yyyyMMdd_HHmmss>_<random>.jpg`; the random part keeps
    /// two captures within the same second apart.
    pub fn create_capture_file(&self, now: DateTime<Local>) -> Result<PhotoPath> {
        let creation_error = |source| GalleryError::CreateCaptureFile {
            dir: self.dir.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(creation_error)?;

        let file = tempfile::Builder::new()
            .prefix(&capture_file_prefix(now))
            .suffix(CAPTURE_SUFFIX)
            .rand_bytes(6)
            .tempfile_in(&self.dir)
            .map_err(creation_error)?;

        let (_file, path) = file.keep().map_err(|e| creation_error(e.error))?;

        tracing::debug!(path = %path.display(), "created capture target");
        Ok(PhotoPath::from(path))
    }

    /// Delete a photo file. Deleting a file that is already gone is not an error.
    pub fn remove(&self, photo: &PhotoPath) -> Result<()> {
        match fs::remove_file(photo.as_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// File name prefix for a capture taken at `now`
pub fn capture_file_prefix(now: DateTime<Local>) -> String {
    format!("JPEG_{}_", now.format("%Y%m%d_%H%M%S"))
}
