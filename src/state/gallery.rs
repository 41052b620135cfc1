/// Gallery screen state
///
/// Owns the photo list for the lifetime of the screen. The list is seeded once
/// from the pictures directory and afterwards only grows, by one path per
/// successful capture. The grid adapter is told about each append so it can
/// add a single cell instead of rebinding everything.
use chrono::{DateTime, Local};
use std::sync::Arc;

use super::capture::{CaptureOutcome, CaptureResolved, CaptureState, PendingCapture};
use super::data::PhotoPath;
use super::permissions::{Permission, PermissionFlow, PermissionStep, REQUIRED_PERMISSIONS};
use super::store::PhotoStore;
use crate::error::{GalleryError, Result};
use crate::platform::{ContentUri, FileProvider, PermissionPort};
use crate::ui::grid::GridAdapter;
use crate::ui::layout::{self, ColumnPolicy};

/// Notice shown when the capture target cannot be created
pub const CREATE_FILE_FAILED: &str = "Could not create the file for the photo";

/// Notice shown once the camera permission is refused for good
pub const CAMERA_UNAVAILABLE: &str = "Camera unavailable: the camera permission was denied";

#[derive(Debug, Clone)]
pub struct GalleryOptions {
    pub screen_width: u32,
    pub item_width: u32,
    pub column_policy: ColumnPolicy,
    pub max_rationale_prompts: u32,
}

pub struct GalleryScreen {
    store: PhotoStore,
    files: Arc<FileProvider>,
    photos: Vec<PhotoPath>,
    adapter: GridAdapter,
    capture: CaptureState,
    permissions: PermissionFlow,
    column_policy: ColumnPolicy,
    /// Toast-style message for the user, dismissible
    notice: Option<String>,
}

impl GalleryScreen {
    /// List the pictures directory and bind it to a fresh grid.
    ///
    /// Returns the screen and the photos whose thumbnails need decoding.
    pub fn initialize(
        store: PhotoStore,
        files: Arc<FileProvider>,
        options: GalleryOptions,
    ) -> (Self, Vec<PhotoPath>) {
        let photos = store.list();
        tracing::info!(count = photos.len(), dir = %store.dir().display(), "loaded gallery");

        let columns = layout::columns(options.screen_width, options.item_width);
        let mut adapter = GridAdapter::new(options.item_width, columns);
        let to_decode = adapter.bind(&photos);

        let screen = GalleryScreen {
            store,
            files,
            photos,
            adapter,
            capture: CaptureState::Idle,
            permissions: PermissionFlow::new(REQUIRED_PERMISSIONS, options.max_rationale_prompts),
            column_policy: options.column_policy,
            notice: None,
        };

        (screen, to_decode)
    }

    pub fn photos(&self) -> &[PhotoPath] {
        &self.photos
    }

    pub fn adapter(&self) -> &GridAdapter {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut GridAdapter {
        &mut self.adapter
    }

    #[cfg(test)]
    pub fn capture_state(&self) -> &CaptureState {
        &self.capture
    }

    pub fn permissions(&self) -> &PermissionFlow {
        &self.permissions
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// The "open camera" action is offered only with the permission granted
    /// and no capture in flight
    pub fn camera_enabled(&self) -> bool {
        self.permissions.is_granted() && !self.capture.is_pending()
    }

    pub fn check_permissions(&mut self, port: &dyn PermissionPort) -> PermissionStep {
        self.permissions.check(port)
    }

    pub fn handle_permission_result(
        &mut self,
        requested: &[Permission],
        port: &dyn PermissionPort,
    ) -> PermissionStep {
        let step = self.permissions.on_result(requested, port);
        if let PermissionStep::Unavailable(_) = step {
            self.notice = Some(CAMERA_UNAVAILABLE.to_string());
        }
        step
    }

    pub fn acknowledge_rationale(&mut self) -> PermissionStep {
        self.permissions.acknowledge_rationale()
    }

    /// Prepare a capture: create the target file and return the URI the
    /// camera should write to.
    pub fn request_capture(&mut self) -> Result<ContentUri> {
        self.request_capture_at(Local::now())
    }

    pub fn request_capture_at(&mut self, now: DateTime<Local>) -> Result<ContentUri> {
        if !self.permissions.is_granted() {
            return Err(GalleryError::CameraUnavailable);
        }
        self.capture.ensure_ready()?;

        let path = match self.store.create_capture_file(now) {
            Ok(path) => path,
            Err(e) => {
                tracing::error!("capture aborted: {}", e);
                self.notice = Some(CREATE_FILE_FAILED.to_string());
                return Err(e);
            }
        };

        let uri = match self.files.uri_for_file(path.as_path()) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::error!("capture aborted: {}", e);
                self.discard(&path);
                self.notice = Some(CREATE_FILE_FAILED.to_string());
                return Err(e);
            }
        };

        self.capture.request(PendingCapture {
            path: path.clone(),
            uri: uri.clone(),
        })?;

        tracing::info!(%uri, "dispatching capture");
        Ok(uri)
    }

    /// Apply the camera's result. On success the photo is appended and its
    /// path returned for thumbnail decoding; otherwise the target is deleted.
    pub fn handle_capture_result(&mut self, outcome: CaptureOutcome) -> Option<PhotoPath> {
        match self.capture.resolve(outcome) {
            None => {
                tracing::warn!("capture result with no capture pending, ignored");
                None
            }
            Some(CaptureResolved::Success(path)) => {
                self.photos.push(path.clone());
                let index = self.photos.len() - 1;
                tracing::info!(%path, index, "photo added");
                self.adapter.notify_item_inserted(index, &self.photos)
            }
            Some(CaptureResolved::Failure { discarded, reason }) => {
                match reason {
                    Some(reason) => tracing::warn!("capture failed: {}", reason),
                    None => tracing::info!("capture cancelled"),
                }
                self.discard(&discarded);
                None
            }
        }
    }

    /// The window width changed. Returns true if the grid needs a new layout.
    pub fn on_viewport_resized(&mut self, screen_width: u32) -> bool {
        match self.column_policy {
            ColumnPolicy::Fixed => false,
            ColumnPolicy::FollowViewport => self.adapter.relayout(screen_width),
        }
    }

    fn discard(&self, path: &PhotoPath) {
        if let Err(e) = self.store.remove(path) {
            tracing::warn!(%path, "could not delete capture target: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::testing::{FakeCamera, FakePermissions};
    use crate::platform::CameraPort;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn options(policy: ColumnPolicy) -> GalleryOptions {
        GalleryOptions {
            screen_width: 960,
            item_width: 160,
            column_policy: policy,
            max_rationale_prompts: 3,
        }
    }

    fn open_gallery(dir: &Path) -> (GalleryScreen, Arc<FileProvider>) {
        let files = Arc::new(FileProvider::new("test.fileprovider", dir));
        let (mut gallery, _) = GalleryScreen::initialize(
            PhotoStore::new(dir),
            files.clone(),
            options(ColumnPolicy::FollowViewport),
        );
        let port = FakePermissions::granted(&[Permission::Camera]);
        assert_eq!(gallery.check_permissions(&port), PermissionStep::Granted);
        (gallery, files)
    }

    fn camera(files: Arc<FileProvider>, outcome: CaptureOutcome) -> FakeCamera {
        FakeCamera {
            files,
            outcome,
            bytes: b"jpeg bytes".to_vec(),
        }
    }

    fn pictures_with(names: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        dir
    }

    #[test]
    fn empty_directory_gives_an_empty_grid() {
        let dir = tempfile::tempdir().unwrap();
        let (gallery, _) = open_gallery(&dir.path().join("Pictures"));

        assert!(gallery.photos().is_empty());
        assert!(gallery.adapter().is_empty());
        assert_eq!(gallery.adapter().columns(), 6);
    }

    #[test]
    fn initial_list_follows_the_directory_listing() {
        let dir = pictures_with(&["a.jpg", "b.jpg", "c.jpg"]);
        let (gallery, _) = open_gallery(dir.path());

        assert_eq!(gallery.photos(), PhotoStore::new(dir.path()).list().as_slice());
        assert_eq!(gallery.adapter().len(), 3);
        let cell_paths: Vec<_> = gallery.adapter().cells().iter().map(|c| c.path.clone()).collect();
        assert_eq!(cell_paths, gallery.photos());
    }

    #[test]
    fn successful_capture_appends_one_photo() {
        let dir = pictures_with(&["a.jpg", "b.jpg"]);
        let (mut gallery, files) = open_gallery(dir.path());
        let before = gallery.photos().to_vec();

        let uri = gallery.request_capture().unwrap();
        assert!(gallery.capture_state().is_pending());
        assert!(!gallery.camera_enabled());

        let outcome = camera(files, CaptureOutcome::Success).capture(&uri);
        let added = gallery.handle_capture_result(outcome).unwrap();

        assert_eq!(gallery.photos().len(), before.len() + 1);
        assert_eq!(gallery.photos().last(), Some(&added));
        assert_eq!(&gallery.photos()[..before.len()], before.as_slice());
        assert_eq!(fs::read(added.as_path()).unwrap(), b"jpeg bytes");
        assert_eq!(gallery.adapter().len(), 3);
        assert!(gallery.camera_enabled());
    }

    #[test]
    fn cancelled_capture_removes_the_target() {
        let dir = pictures_with(&["a.jpg"]);
        let (mut gallery, files) = open_gallery(dir.path());
        let before = gallery.photos().to_vec();

        let uri = gallery.request_capture().unwrap();
        let target = files.resolve(&uri).unwrap();
        assert!(target.exists());

        let outcome = camera(files, CaptureOutcome::Cancelled).capture(&uri);
        assert_eq!(gallery.handle_capture_result(outcome), None);

        assert_eq!(gallery.photos(), before.as_slice());
        assert_eq!(gallery.adapter().len(), 1);
        assert!(!target.exists());
    }

    #[test]
    fn failed_capture_removes_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let (mut gallery, files) = open_gallery(dir.path());

        let uri = gallery.request_capture().unwrap();
        let target = files.resolve(&uri).unwrap();

        gallery.handle_capture_result(CaptureOutcome::Failed("camera crashed".into()));

        assert!(gallery.photos().is_empty());
        assert!(!target.exists());
    }

    #[test]
    fn second_capture_is_refused_while_one_is_pending() {
        let dir = tempfile::tempdir().unwrap();
        let (mut gallery, _) = open_gallery(dir.path());

        gallery.request_capture().unwrap();
        let err = gallery.request_capture().unwrap_err();

        assert!(matches!(err, GalleryError::CaptureInProgress));
        // Only the first target exists on disk
        assert_eq!(PhotoStore::new(dir.path()).list().len(), 1);
    }

    #[test]
    fn file_creation_failure_aborts_with_a_notice() {
        let dir = tempfile::tempdir().unwrap();
        let pictures = dir.path().join("Pictures");
        let (mut gallery, _) = open_gallery(&pictures);
        fs::write(&pictures, b"a file where the directory should be").unwrap();

        let err = gallery.request_capture().unwrap_err();

        assert!(matches!(err, GalleryError::CreateCaptureFile { .. }));
        assert_eq!(gallery.notice(), Some(CREATE_FILE_FAILED));
        assert!(!gallery.capture_state().is_pending());
        assert!(gallery.photos().is_empty());

        gallery.dismiss_notice();
        assert_eq!(gallery.notice(), None);
    }

    #[test]
    fn stray_capture_result_changes_nothing() {
        let dir = pictures_with(&["a.jpg"]);
        let (mut gallery, _) = open_gallery(dir.path());

        assert_eq!(gallery.handle_capture_result(CaptureOutcome::Success), None);
        assert_eq!(gallery.photos().len(), 1);
    }

    #[test]
    fn capture_needs_the_camera_permission() {
        let dir = tempfile::tempdir().unwrap();
        let files = Arc::new(FileProvider::new("test", dir.path()));
        let (mut gallery, _) = GalleryScreen::initialize(
            PhotoStore::new(dir.path()),
            files,
            options(ColumnPolicy::Fixed),
        );
        let port = FakePermissions::denied();
        port.block(Permission::Camera);

        assert!(matches!(gallery.check_permissions(&port), PermissionStep::Request(_)));
        assert!(matches!(
            gallery.handle_permission_result(&[Permission::Camera], &port),
            PermissionStep::Unavailable(_)
        ));

        assert!(matches!(gallery.request_capture(), Err(GalleryError::CameraUnavailable)));
        assert_eq!(gallery.notice(), Some(CAMERA_UNAVAILABLE));
        assert!(!gallery.camera_enabled());
        assert!(PhotoStore::new(dir.path()).list().is_empty());
    }

    #[test]
    fn granted_permissions_show_no_dialog() {
        let dir = tempfile::tempdir().unwrap();
        let files = Arc::new(FileProvider::new("test", dir.path()));
        let (mut gallery, _) = GalleryScreen::initialize(
            PhotoStore::new(dir.path()),
            files,
            options(ColumnPolicy::Fixed),
        );
        let port = FakePermissions::granted(&[Permission::Camera]);

        assert_eq!(gallery.check_permissions(&port), PermissionStep::Granted);
        assert_eq!(gallery.permissions().rationale(), None);
        assert_eq!(port.request_count(), 0);
    }

    #[test]
    fn column_policy_decides_whether_resizes_relayout() {
        let dir = tempfile::tempdir().unwrap();
        let files = Arc::new(FileProvider::new("test", dir.path()));

        let (mut fixed, _) = GalleryScreen::initialize(
            PhotoStore::new(dir.path()),
            files.clone(),
            options(ColumnPolicy::Fixed),
        );
        assert!(!fixed.on_viewport_resized(320));
        assert_eq!(fixed.adapter().columns(), 6);

        let (mut following, _) = GalleryScreen::initialize(
            PhotoStore::new(dir.path()),
            files,
            options(ColumnPolicy::FollowViewport),
        );
        assert!(following.on_viewport_resized(320));
        assert_eq!(following.adapter().columns(), 2);
    }
}
