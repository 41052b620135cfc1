use iced::widget::{button, column, container, horizontal_space, row, text};
use iced::{Alignment, Element, Length, Size, Subscription, Task, Theme};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod media;
mod platform;
mod state;
mod ui;

use config::Config;
use media::thumbnail::{ThumbnailLoader, MAX_CONCURRENT_DECODES};
use media::DecodedImage;
use platform::{CameraPort, ContentUri, FileProvider, PermissionPort, Platform, SharePort, ShareRequest};
use state::capture::CaptureOutcome;
use state::data::PhotoPath;
use state::gallery::{GalleryOptions, GalleryScreen};
use state::permissions::{Permission, PermissionStep};
use state::photo::PhotoScreen;
use state::store::PhotoStore;

/// The screen currently shown
enum Screen {
    Gallery,
    Photo(PhotoScreen),
}

/// Main application state
struct PhotoGallery {
    /// Lives as long as the app; the photo screen is shown on top of it
    gallery: GalleryScreen,
    screen: Screen,
    platform: Platform,
    thumbnails: ThumbnailLoader,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Open camera"
    OpenCamera,
    /// The camera returned
    CaptureFinished(CaptureOutcome),
    /// The permission dialog for these permissions closed
    PermissionsAnswered(Vec<Permission>),
    /// User acknowledged the permission rationale
    RationaleAcknowledged,
    ThumbnailLoaded(PhotoPath, Option<DecodedImage>),
    /// User tapped a grid cell
    OpenPhoto { photo_path: String },
    PhotoDecoded(PhotoPath, Option<DecodedImage>),
    SharePhoto,
    /// The share hand-off was made; nothing waits on it
    ShareDispatched,
    Back,
    WindowResized(Size),
    DismissNotice,
}

impl PhotoGallery {
    /// Create a new instance of the application
    fn new(config: Config) -> (Self, Task<Message>) {
        let pre_granted = config.granted_permissions.clone();
        Self::with_platform(config, move |files| Platform::desktop(files, &pre_granted))
    }

    /// Build the app on top of the ports `platform` makes for the pictures root
    fn with_platform(
        config: Config,
        platform: impl FnOnce(Arc<FileProvider>) -> Platform,
    ) -> (Self, Task<Message>) {
        let store = PhotoStore::new(config.pictures_dir());
        let files = Arc::new(FileProvider::new(
            config.file_provider_authority.clone(),
            store.dir(),
        ));
        let platform = platform(files.clone());
        let thumbnails = ThumbnailLoader::new(config.thumbnail_size, MAX_CONCURRENT_DECODES);

        let (mut gallery, to_decode) = GalleryScreen::initialize(
            store,
            files,
            GalleryOptions {
                screen_width: config.window_width,
                item_width: config.item_width,
                column_policy: config.column_policy,
                max_rationale_prompts: config.max_rationale_prompts,
            },
        );

        let decodes = Task::batch(to_decode.into_iter().map(|photo| load_thumbnail(&thumbnails, photo)));

        let step = gallery.check_permissions(platform.permissions.as_ref());
        let permissions = follow_permission_step(step, &platform.permissions);

        (
            PhotoGallery {
                gallery,
                screen: Screen::Gallery,
                platform,
                thumbnails,
            },
            Task::batch([decodes, permissions]),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenCamera => match self.gallery.request_capture() {
                Ok(uri) => Task::perform(
                    run_camera(self.platform.camera.clone(), uri),
                    Message::CaptureFinished,
                ),
                Err(e) => {
                    tracing::warn!("camera not opened: {}", e);
                    Task::none()
                }
            },
            Message::CaptureFinished(outcome) => {
                match self.gallery.handle_capture_result(outcome) {
                    Some(photo) => load_thumbnail(&self.thumbnails, photo),
                    None => Task::none(),
                }
            }
            Message::PermissionsAnswered(requested) => {
                let step = self
                    .gallery
                    .handle_permission_result(&requested, self.platform.permissions.as_ref());
                follow_permission_step(step, &self.platform.permissions)
            }
            Message::RationaleAcknowledged => {
                let step = self.gallery.acknowledge_rationale();
                follow_permission_step(step, &self.platform.permissions)
            }
            Message::ThumbnailLoaded(photo, decoded) => {
                self.gallery.adapter_mut().set_thumbnail(&photo, decoded);
                Task::none()
            }
            Message::OpenPhoto { photo_path } => {
                let screen = PhotoScreen::open(photo_path);
                let photo = screen.photo_path().clone();
                self.screen = Screen::Photo(screen);

                Task::perform(
                    async move {
                        let decoded = media::decode::decode_full(photo.as_path().to_path_buf()).await;
                        (photo, decoded)
                    },
                    |(photo, decoded)| Message::PhotoDecoded(photo, decoded),
                )
            }
            Message::PhotoDecoded(photo, decoded) => {
                // The user may have gone back or opened another photo meanwhile
                if let Screen::Photo(screen) = &mut self.screen {
                    if screen.photo_path() == &photo {
                        screen.on_decoded(decoded);
                    }
                }
                Task::none()
            }
            Message::SharePhoto => {
                let Screen::Photo(screen) = &self.screen else {
                    return Task::none();
                };

                match screen.share_request(&self.platform.files) {
                    Ok(request) => Task::perform(
                        run_share(self.platform.share.clone(), request),
                        |()| Message::ShareDispatched,
                    ),
                    Err(e) => {
                        tracing::warn!(path = %screen.photo_path(), "cannot share photo: {}", e);
                        Task::none()
                    }
                }
            }
            Message::ShareDispatched => Task::none(),
            Message::Back => {
                self.screen = Screen::Gallery;
                Task::none()
            }
            Message::WindowResized(size) => {
                if self.gallery.on_viewport_resized(size.width as u32) {
                    tracing::debug!(columns = self.gallery.adapter().columns(), "grid relayout");
                }
                Task::none()
            }
            Message::DismissNotice => {
                self.gallery.dismiss_notice();
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        match &self.screen {
            Screen::Gallery => self.gallery_view(),
            Screen::Photo(screen) => ui::photo::view(screen),
        }
    }

    fn gallery_view(&self) -> Element<'_, Message> {
        let toolbar = row![
            text(format!("Gallery ({})", self.gallery.photos().len())).size(24),
            horizontal_space(),
            button("Open camera")
                .on_press_maybe(self.gallery.camera_enabled().then_some(Message::OpenCamera))
                .padding(10),
        ]
        .spacing(12)
        .padding(8)
        .align_y(Alignment::Center);

        let mut content = column![toolbar];

        if let Some(notice) = self.gallery.notice() {
            content = content.push(
                row![
                    text(notice).size(14),
                    horizontal_space(),
                    button("Dismiss").on_press(Message::DismissNotice),
                ]
                .spacing(12)
                .padding(8)
                .align_y(Alignment::Center),
            );
        }

        if let Some(permissions) = self.gallery.permissions().rationale() {
            let names: Vec<&str> = permissions.iter().map(Permission::label).collect();
            content = content.push(
                container(
                    column![
                        text(format!(
                            "This app needs these permissions to take photos: {}",
                            names.join(", ")
                        ))
                        .size(16),
                        button("OK").on_press(Message::RationaleAcknowledged).padding(10),
                    ]
                    .spacing(12),
                )
                .padding(16)
                .width(Length::Fill),
            );
        }

        content.push(self.gallery.adapter().view()).into()
    }

    fn subscription(&self) -> Subscription<Message> {
        iced::window::resize_events().map(|(_id, size)| Message::WindowResized(size))
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Turn a permission step into the platform request it calls for
fn follow_permission_step(step: PermissionStep, port: &Arc<dyn PermissionPort>) -> Task<Message> {
    match step {
        PermissionStep::Request(permissions) => {
            Task::perform(request_permissions(port.clone(), permissions), Message::PermissionsAnswered)
        }
        PermissionStep::Granted => {
            tracing::info!("all permissions granted");
            Task::none()
        }
        // The rationale and the unavailable notice are rendered from gallery state
        PermissionStep::ShowRationale(_) | PermissionStep::Unavailable(_) | PermissionStep::Idle => {
            Task::none()
        }
    }
}

/// Queue a thumbnail decode; the loader bounds how many run at once
fn load_thumbnail(loader: &ThumbnailLoader, photo: PhotoPath) -> Task<Message> {
    Task::perform(loader.clone().load(photo), |(photo, decoded)| {
        Message::ThumbnailLoaded(photo, decoded)
    })
}

/// Hand control to the camera and wait for its single result
async fn run_camera(camera: Arc<dyn CameraPort>, output: ContentUri) -> CaptureOutcome {
    tokio::task::spawn_blocking(move || camera.capture(&output))
        .await
        .unwrap_or_else(|e| CaptureOutcome::Failed(format!("camera task join error: {}", e)))
}

/// Show the permission dialog. Always answers with the permissions asked
/// for, so a failed dialog is judged like a refusal.
async fn request_permissions(port: Arc<dyn PermissionPort>, permissions: Vec<Permission>) -> Vec<Permission> {
    let requested = permissions.clone();
    tokio::task::spawn_blocking(move || port.request(&permissions))
        .await
        .unwrap_or_else(|e| tracing::error!("permission task join error: {}", e));
    requested
}

async fn run_share(share: Arc<dyn SharePort>, request: ShareRequest) {
    let uri = request.uri.clone();
    match tokio::task::spawn_blocking(move || share.send(&request)).await {
        Ok(Ok(())) => tracing::debug!(%uri, "share handed off"),
        Ok(Err(e)) => tracing::warn!(%uri, "share failed: {}", e),
        Err(e) => tracing::error!("share task join error: {}", e),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> iced::Result {
    init_tracing();

    let config = Config::load().unwrap_or_else(|e| {
        tracing::error!("{}; using default settings", e);
        Config::default()
    });
    let window_size = Size::new(config.window_width as f32, config.window_height as f32);

    iced::application("Photo Gallery", PhotoGallery::update, PhotoGallery::view)
        .subscription(PhotoGallery::subscription)
        .theme(PhotoGallery::theme)
        .window_size(window_size)
        .centered()
        .run_with(move || PhotoGallery::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::testing::{FakeCamera, FakePermissions, FakeShare};
    use crate::ui::grid::Thumbnail;
    use crate::state::photo::PhotoImage;
    use std::fs;
    use tempfile::TempDir;

    fn app(dir: &TempDir, permissions: FakePermissions, max_rationale_prompts: u32) -> PhotoGallery {
        let config = Config {
            pictures_dir: Some(dir.path().to_path_buf()),
            file_provider_authority: "test.fileprovider".to_string(),
            max_rationale_prompts,
            ..Config::default()
        };

        let (app, _) = PhotoGallery::with_platform(config, move |files| Platform {
            camera: Arc::new(FakeCamera {
                files: files.clone(),
                outcome: CaptureOutcome::Success,
                bytes: Vec::new(),
            }),
            share: Arc::new(FakeShare),
            permissions: Arc::new(permissions),
            files,
        });
        app
    }

    fn pixel() -> DecodedImage {
        DecodedImage {
            width: 3,
            height: 2,
            pixels: vec![0; 3 * 2 * 4],
        }
    }

    fn open(app: &mut PhotoGallery, path: &PhotoPath) {
        let _ = app.update(Message::OpenPhoto {
            photo_path: path.to_string(),
        });
    }

    fn shown_image(app: &PhotoGallery) -> &PhotoImage {
        match &app.screen {
            Screen::Photo(screen) => screen.image(),
            Screen::Gallery => panic!("photo screen expected"),
        }
    }

    #[test]
    fn startup_binds_the_listing_and_checks_permissions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"x").unwrap();

        let app = app(&dir, FakePermissions::granted(&[Permission::Camera]), 3);

        assert!(matches!(app.screen, Screen::Gallery));
        assert_eq!(app.gallery.photos().len(), 1);
        assert!(app.gallery.camera_enabled());
    }

    #[test]
    fn capture_round_trip_adds_one_cell() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        let mut app = app(&dir, FakePermissions::granted(&[Permission::Camera]), 3);

        let _ = app.update(Message::OpenCamera);
        assert!(!app.gallery.camera_enabled());

        let _ = app.update(Message::CaptureFinished(CaptureOutcome::Success));
        assert_eq!(app.gallery.photos().len(), 2);
        let added = app.gallery.photos()[1].clone();
        assert!(added.as_path().exists());
        assert!(matches!(app.gallery.adapter().cells()[1].thumbnail, Thumbnail::Loading));

        let _ = app.update(Message::ThumbnailLoaded(added, Some(pixel())));
        assert!(matches!(app.gallery.adapter().cells()[1].thumbnail, Thumbnail::Ready(_)));
        assert!(app.gallery.camera_enabled());
    }

    #[test]
    fn cancelled_capture_leaves_the_grid_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir, FakePermissions::granted(&[Permission::Camera]), 3);

        let _ = app.update(Message::OpenCamera);
        let _ = app.update(Message::CaptureFinished(CaptureOutcome::Cancelled));

        assert!(app.gallery.photos().is_empty());
        assert!(PhotoStore::new(dir.path()).list().is_empty());
    }

    #[test]
    fn late_decode_for_another_photo_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir, FakePermissions::granted(&[Permission::Camera]), 3);
        let first = PhotoPath::from(dir.path().join("first.jpg"));
        let second = PhotoPath::from(dir.path().join("second.jpg"));

        open(&mut app, &first);
        let _ = app.update(Message::Back);
        open(&mut app, &second);

        let _ = app.update(Message::PhotoDecoded(first, Some(pixel())));
        assert!(matches!(shown_image(&app), PhotoImage::Decoding));

        let _ = app.update(Message::PhotoDecoded(second, Some(pixel())));
        assert!(matches!(
            shown_image(&app),
            PhotoImage::Ready {
                width: 3,
                height: 2,
                ..
            }
        ));
    }

    #[test]
    fn failed_decode_shows_a_blank_photo() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir, FakePermissions::granted(&[Permission::Camera]), 3);
        let photo = PhotoPath::from(dir.path().join("broken.jpg"));

        open(&mut app, &photo);
        let _ = app.update(Message::PhotoDecoded(photo, None));
        assert!(matches!(shown_image(&app), PhotoImage::Blank));
    }

    #[test]
    fn decode_arriving_after_back_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir, FakePermissions::granted(&[Permission::Camera]), 3);
        let photo = PhotoPath::from(dir.path().join("a.jpg"));

        open(&mut app, &photo);
        let _ = app.update(Message::Back);
        let _ = app.update(Message::PhotoDecoded(photo, Some(pixel())));

        assert!(matches!(app.screen, Screen::Gallery));
    }

    #[test]
    fn empty_permission_answers_end_in_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir, FakePermissions::denied(), 1);

        let _ = app.update(Message::PermissionsAnswered(Vec::new()));
        assert!(app.gallery.permissions().rationale().is_some());

        let _ = app.update(Message::RationaleAcknowledged);
        let _ = app.update(Message::PermissionsAnswered(Vec::new()));

        assert!(app.gallery.permissions().rationale().is_none());
        assert!(app.gallery.notice().is_some());
        assert!(!app.gallery.camera_enabled());

        let _ = app.update(Message::DismissNotice);
        assert!(app.gallery.notice().is_none());
    }

    #[test]
    fn both_screens_render_from_state() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        let mut app = app(&dir, FakePermissions::granted(&[Permission::Camera]), 3);
        let _ = app.view();

        let photo = app.gallery.photos()[0].clone();
        open(&mut app, &photo);
        let _ = app.update(Message::PhotoDecoded(photo, Some(pixel())));
        let _ = app.view();
    }
}
