use std::path::{Component, Path, PathBuf};

use super::ContentUri;
use crate::error::{GalleryError, Result};

/// Authority used when the config does not name one
pub const DEFAULT_AUTHORITY: &str = "photo.gallery.fileprovider";

const SCHEME: &str = "content://";

/// Path segment that stands for the shared root in every URI
const ROOT_NAME: &str = "pictures";

/// Maps files under one shared root to `content://<authority>/pictures/<path>`
/// URIs and back. Only files below the root can be named.
#[derive(Debug, Clone)]
pub struct FileProvider {
    authority: String,
    root: PathBuf,
}

impl FileProvider {
    pub fn new(authority: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        FileProvider {
            authority: authority.into(),
            root: root.into(),
        }
    }

    fn uri_prefix(&self) -> String {
        format!("{}{}/{}/", SCHEME, self.authority, ROOT_NAME)
    }

    pub fn uri_for_file(&self, path: &Path) -> Result<ContentUri> {
        let outside = || GalleryError::OutsideSharedRoot(path.to_path_buf());

        let relative = path.strip_prefix(&self.root).map_err(|_| outside())?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => {
                    segments.push(segment.to_str().ok_or_else(outside)?);
                }
                _ => return Err(outside()),
            }
        }

        if segments.is_empty() {
            return Err(outside());
        }

        Ok(ContentUri::new(format!("{}{}", self.uri_prefix(), segments.join("/"))))
    }

    /// Local path a URI from this provider points at
    pub fn resolve(&self, uri: &ContentUri) -> Result<PathBuf> {
        let invalid = || GalleryError::InvalidUri(uri.to_string());

        let relative = uri
            .as_str()
            .strip_prefix(&self.uri_prefix())
            .ok_or_else(invalid)?;

        let mut path = self.root.clone();
        for segment in relative.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(invalid());
            }
            path.push(segment);
        }

        Ok(path)
    }
}
