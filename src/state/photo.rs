/// Photo screen state: one photo at full size, shareable
use iced::widget::image::Handle;

use super::data::PhotoPath;
use crate::error::Result;
use crate::media::DecodedImage;
use crate::platform::{FileProvider, ShareRequest, JPEG_MIME};

#[derive(Debug, Clone)]
pub enum PhotoImage {
    Decoding,
    Ready {
        handle: Handle,
        width: u32,
        height: u32,
    },
    /// Missing or corrupt file: the screen stays up with nothing to show
    Blank,
}

#[derive(Debug, Clone)]
pub struct PhotoScreen {
    photo_path: PhotoPath,
    image: PhotoImage,
}

impl PhotoScreen {
    /// Open the screen for the `photo_path` navigation parameter
    pub fn open(photo_path: impl Into<String>) -> Self {
        PhotoScreen {
            photo_path: PhotoPath::new(photo_path),
            image: PhotoImage::Decoding,
        }
    }

    pub fn photo_path(&self) -> &PhotoPath {
        &self.photo_path
    }

    pub fn image(&self) -> &PhotoImage {
        &self.image
    }

    /// Apply the decode result for this screen's photo
    pub fn on_decoded(&mut self, decoded: Option<DecodedImage>) {
        self.image = match decoded {
            Some(decoded) => PhotoImage::Ready {
                handle: decoded.handle(),
                width: decoded.width,
                height: decoded.height,
            },
            None => PhotoImage::Blank,
        };
    }

    /// The request handed to the share port for this photo
    pub fn share_request(&self, files: &FileProvider) -> Result<ShareRequest> {
        Ok(ShareRequest {
            uri: files.uri_for_file(self.photo_path.as_path())?,
            mime_type: JPEG_MIME,
        })
    }
}
