/// Full-size photo decoding
use iced::widget::image::Handle;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::task;

use crate::error::Result;

/// RGBA8 pixels ready to hand to the renderer
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn from_dynamic(img: image::DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        DecodedImage {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        }
    }

    pub fn handle(&self) -> Handle {
        Handle::from_rgba(self.width, self.height, self.pixels.clone())
    }
}

// Pixel buffers are too large to print
impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Decode a photo at full resolution.
///
/// Returns `None` for missing, unreadable or corrupt files.
pub async fn decode_full(path: PathBuf) -> Option<DecodedImage> {
    let shown = path.display().to_string();

    // Spawn blocking because decoding a large JPEG is CPU-intensive
    match task::spawn_blocking(move || decode_full_blocking(&path)).await {
        Ok(Ok(decoded)) => Some(decoded),
        Ok(Err(e)) => {
            tracing::warn!(path = %shown, "could not decode photo: {}", e);
            None
        }
        Err(e) => {
            tracing::error!("decode task join error: {}", e);
            None
        }
    }
}

/// Blocking implementation of full-size decoding
pub fn decode_full_blocking(path: &Path) -> Result<DecodedImage> {
    let img = image::open(path)?;
    tracing::debug!(path = %path.display(), width = img.width(), height = img.height(), "decoded photo");
    Ok(DecodedImage::from_dynamic(img))
}
