/// Application configuration
///
/// Loaded once at startup from a JSON file. Every field has a default, so a
/// missing file (or a file that only sets a few keys) is fine.
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{GalleryError, Result};
use crate::platform::file_provider::DEFAULT_AUTHORITY;
use crate::state::permissions::Permission;
use crate::ui::layout::ColumnPolicy;

/// Directory name used under the platform config/data directories
pub const APP_DIR: &str = "photo-gallery";

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV: &str = "PHOTO_GALLERY_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where photos are stored. Defaults to the app-private "Pictures" folder.
    pub pictures_dir: Option<PathBuf>,
    /// Authority used when building content URIs for captured/shared files
    pub file_provider_authority: String,
    /// Width of one grid cell in pixels
    pub item_width: u32,
    /// Longest edge of decoded thumbnails
    pub thumbnail_size: u32,
    pub window_width: u32,
    pub window_height: u32,
    pub column_policy: ColumnPolicy,
    /// How many times the permission rationale is shown before giving up
    pub max_rationale_prompts: u32,
    /// Permissions treated as already granted at startup
    pub granted_permissions: Vec<Permission>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pictures_dir: None,
            file_provider_authority: DEFAULT_AUTHORITY.to_string(),
            item_width: 160,
            thumbnail_size: 256,
            window_width: 960,
            window_height: 720,
            column_policy: ColumnPolicy::FollowViewport,
            max_rationale_prompts: 3,
            granted_permissions: Vec::new(),
        }
    }
}

impl Config {
    /// Load the config from `$PHOTO_GALLERY_CONFIG` or the default location.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load the config from a specific file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&contents).map_err(|source| GalleryError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get the path where the config file is expected
    /// - Linux: ~/.config/photo-gallery/config.json
    /// - macOS: ~/Library/Application Support/photo-gallery/config.json
    /// - Windows: %APPDATA%\photo-gallery\config.json
    pub fn config_path() -> Option<PathBuf> {
        if let Some(explicit) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(explicit));
        }
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
    }

    /// The app-private pictures directory
    pub fn pictures_dir(&self) -> PathBuf {
        if let Some(dir) = &self.pictures_dir {
            return dir.clone();
        }

        let mut path = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        path.push(APP_DIR);
        path.push("Pictures");
        path
    }
}
