/// Shared data structures for the application state
///
/// These types flow between the gallery state, the grid and the photo screen.
use std::fmt;
use std::path::{Path, PathBuf};

/// Absolute location of one photo in the pictures directory.
///
/// A photo has no identity beyond its path: no id, no capture time, no
/// metadata. Two paths are the same photo when the strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhotoPath(String);

impl PhotoPath {
    pub fn new(path: impl Into<String>) -> Self {
        PhotoPath(path.into())
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// File name component, used as the display label in the photo screen
    pub fn file_name(&self) -> String {
        self.as_path()
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.0.clone())
    }
}

impl From<&Path> for PhotoPath {
    fn from(path: &Path) -> Self {
        PhotoPath(path.to_string_lossy().to_string())
    }
}

impl From<PathBuf> for PhotoPath {
    fn from(path: PathBuf) -> Self {
        PhotoPath::from(path.as_path())
    }
}

impl fmt::Display for PhotoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
