use image::imageops::FilterType;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task;

use super::DecodedImage;
use crate::error::Result;
use crate::state::data::PhotoPath;

/// How many thumbnails may be decoded at the same time
pub const MAX_CONCURRENT_DECODES: usize = 4;

/// Decodes grid thumbnails with a bounded number of decodes in flight.
///
/// Every thumbnail task is queued at once when the gallery opens; the
/// semaphore keeps all but `limit` of them waiting for a permit.
#[derive(Debug, Clone)]
pub struct ThumbnailLoader {
    permits: Arc<Semaphore>,
    size: u32,
}

impl ThumbnailLoader {
    pub fn new(size: u32, limit: usize) -> Self {
        ThumbnailLoader {
            permits: Arc::new(Semaphore::new(limit.max(1))),
            size,
        }
    }

    /// Decode a grid thumbnail for a photo.
    ///
    /// Returns the path alongside the result so the grid can match it to its cell.
    pub async fn load(self, photo: PhotoPath) -> (PhotoPath, Option<DecodedImage>) {
        let path = photo.as_path().to_path_buf();
        let size = self.size;

        let thumbnail = match self.run(move || generate_thumbnail(&path, size)).await {
            Some(Ok(thumbnail)) => Some(thumbnail),
            Some(Err(e)) => {
                tracing::warn!(path = %photo, "could not generate thumbnail: {}", e);
                None
            }
            None => None,
        };

        (photo, thumbnail)
    }

    /// Run one blocking decode job once a permit is free
    async fn run<T, F>(&self, job: F) -> Option<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = match self.permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                tracing::error!("thumbnail permits closed: {}", e);
                return None;
            }
        };

        // The permit lives as long as the decode itself
        let result = task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await;

        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("thumbnail task join error: {}", e);
                None
            }
        }
    }
}

/// Decode `path` and shrink it to fit in a `size` x `size` square
pub fn generate_thumbnail(path: &Path, size: u32) -> Result<DecodedImage> {
    let img = image::open(path)?;

    // Never upscale small photos
    let thumbnail = if img.width() <= size && img.height() <= size {
        img
    } else {
        img.resize(size, size, FilterType::Triangle)
    };

    Ok(DecodedImage::from_dynamic(thumbnail))
}
