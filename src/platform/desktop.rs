/// Desktop implementations of the platform ports
///
/// There is no camera activity or share sheet on a desktop, so native dialogs
/// stand in for them:
/// - camera: pick an existing image, stored as a JPEG capture
/// - share: save a copy wherever the user chooses
/// - permissions: a yes/no/cancel message box, "cancel" meaning "don't ask again"
use image::ImageFormat;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{CameraPort, ContentUri, FileProvider, PermissionPort, SharePort, ShareRequest};
use crate::error::Result;
use crate::state::capture::CaptureOutcome;
use crate::state::permissions::Permission;

/// Image types accepted by the picker camera
const PICKABLE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "gif", "tif", "tiff"];

pub struct PickerCamera {
    files: Arc<FileProvider>,
}

impl PickerCamera {
    pub fn new(files: Arc<FileProvider>) -> Self {
        PickerCamera { files }
    }

    fn store_as_jpeg(&self, source: &Path, output: &ContentUri) -> Result<()> {
        let target = self.files.resolve(output)?;
        let img = image::open(source)?;

        // JPEG has no alpha channel
        img.to_rgb8().save_with_format(&target, ImageFormat::Jpeg)?;

        tracing::info!(source = %source.display(), target = %target.display(), "captured photo");
        Ok(())
    }
}

impl CameraPort for PickerCamera {
    fn capture(&self, output: &ContentUri) -> CaptureOutcome {
        let source = FileDialog::new()
            .set_title("Take a photo")
            .add_filter("Images", PICKABLE_EXTENSIONS)
            .pick_file();

        let Some(source) = source else {
            return CaptureOutcome::Cancelled;
        };

        match self.store_as_jpeg(&source, output) {
            Ok(()) => CaptureOutcome::Success,
            Err(e) => CaptureOutcome::Failed(e.to_string()),
        }
    }
}

pub struct SaveCopyShare {
    files: Arc<FileProvider>,
}

impl SaveCopyShare {
    pub fn new(files: Arc<FileProvider>) -> Self {
        SaveCopyShare { files }
    }
}

impl SharePort for SaveCopyShare {
    fn send(&self, request: &ShareRequest) -> Result<()> {
        let source = self.files.resolve(&request.uri)?;
        let file_name = source
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "photo.jpg".to_string());

        let destination = FileDialog::new()
            .set_title(format!("Share {}", request.mime_type))
            .set_file_name(file_name)
            .add_filter("JPEG image", &["jpg", "jpeg"])
            .save_file();

        if let Some(destination) = destination {
            fs::copy(&source, &destination)?;
            tracing::info!(to = %destination.display(), "shared photo");
        }

        Ok(())
    }
}

pub struct DialogPermissions {
    granted: Mutex<HashSet<Permission>>,
    blocked: Mutex<HashSet<Permission>>,
}

impl DialogPermissions {
    pub fn new(pre_granted: &[Permission]) -> Self {
        DialogPermissions {
            granted: Mutex::new(pre_granted.iter().copied().collect()),
            blocked: Mutex::new(HashSet::new()),
        }
    }

    fn granted(&self) -> MutexGuard<'_, HashSet<Permission>> {
        self.granted.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn blocked(&self) -> MutexGuard<'_, HashSet<Permission>> {
        self.blocked.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PermissionPort for DialogPermissions {
    fn is_granted(&self, permission: Permission) -> bool {
        self.granted().contains(&permission)
    }

    fn request(&self, permissions: &[Permission]) {
        for &permission in permissions {
            if self.blocked().contains(&permission) {
                continue;
            }

            let answer = MessageDialog::new()
                .set_level(MessageLevel::Info)
                .set_title("Permission required")
                .set_description(format!(
                    "Allow Photo Gallery to use the {}?\n\nChoose Cancel to stop asking.",
                    permission
                ))
                .set_buttons(MessageButtons::YesNoCancel)
                .show();

            match answer {
                MessageDialogResult::Yes => {
                    self.granted().insert(permission);
                }
                MessageDialogResult::No => {}
                _ => {
                    self.blocked().insert(permission);
                }
            }
        }
    }

    fn should_show_rationale(&self, permission: Permission) -> bool {
        !self.blocked().contains(&permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pre_granted_permissions_are_granted() {
        let port = DialogPermissions::new(&[Permission::Camera]);
        assert!(port.is_granted(Permission::Camera));
        assert!(port.should_show_rationale(Permission::Camera));
    }

    #[test]
    fn picker_camera_stores_a_jpeg_at_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let files = Arc::new(FileProvider::new("test", dir.path()));

        let source = dir.path().join("source.png");
        image::RgbaImage::from_pixel(4, 3, image::Rgba([10, 20, 30, 255]))
            .save(&source)
            .unwrap();
        let target = dir.path().join("JPEG_target.jpg");
        let uri = files.uri_for_file(&target).unwrap();

        PickerCamera::new(files).store_as_jpeg(&source, &uri).unwrap();

        let bytes = fs::read(&target).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
        let stored = image::open(&target).unwrap();
        assert_eq!((stored.width(), stored.height()), (4, 3));
    }
}
