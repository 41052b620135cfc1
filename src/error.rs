/// Error types shared by the gallery, the platform ports and the config layer
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The empty target file for a capture could not be created
    #[error("could not create a capture file in {dir}: {source}")]
    CreateCaptureFile {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("a capture is already in progress")]
    CaptureInProgress,

    #[error("the camera is unavailable until the camera permission is granted")]
    CameraUnavailable,

    #[error("{0} is outside the shared pictures directory")]
    OutsideSharedRoot(PathBuf),

    #[error("unrecognized content URI: {0}")]
    InvalidUri(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, GalleryError>;
