/// Platform collaborators
///
/// The gallery never talks to a camera, a share sheet or a permission dialog
/// directly. It goes through these ports:
/// - `CameraPort` - capture a photo into a target content URI
/// - `SharePort` - hand a file to the system share mechanism
/// - `PermissionPort` - runtime permission checks and requests
/// - `file_provider` - local path <-> content URI mapping
///
/// `desktop` holds the native-dialog implementations used by the binary.

pub mod desktop;
pub mod file_provider;

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::state::capture::CaptureOutcome;
use crate::state::permissions::Permission;

pub use file_provider::FileProvider;

/// MIME type of everything the gallery shares
pub const JPEG_MIME: &str = "image/jpeg";

/// Opaque, shareable handle to a file in the pictures directory
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentUri(String);

impl ContentUri {
    pub fn new(uri: impl Into<String>) -> Self {
        ContentUri(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub uri: ContentUri,
    pub mime_type: &'static str,
}

/// Hands control to a camera, which writes its photo into `output`.
///
/// Blocks until the camera returns; callers run it off the UI thread.
pub trait CameraPort: Send + Sync {
    fn capture(&self, output: &ContentUri) -> CaptureOutcome;
}

/// Fire-and-forget share of one file
pub trait SharePort: Send + Sync {
    fn send(&self, request: &ShareRequest) -> Result<()>;
}

pub trait PermissionPort: Send + Sync {
    fn is_granted(&self, permission: Permission) -> bool;

    /// Ask the user for `permissions`. Answers are read back through `is_granted`.
    fn request(&self, permissions: &[Permission]);

    /// False once the user asked not to be asked again
    fn should_show_rationale(&self, permission: Permission) -> bool;
}

/// The set of ports one running app uses
#[derive(Clone)]
pub struct Platform {
    pub camera: Arc<dyn CameraPort>,
    pub share: Arc<dyn SharePort>,
    pub permissions: Arc<dyn PermissionPort>,
    pub files: Arc<FileProvider>,
}

impl Platform {
    /// Native-dialog implementations for desktop systems
    pub fn desktop(files: Arc<FileProvider>, pre_granted: &[Permission]) -> Self {
        Platform {
            camera: Arc::new(desktop::PickerCamera::new(files.clone())),
            share: Arc::new(desktop::SaveCopyShare::new(files.clone())),
            permissions: Arc::new(desktop::DialogPermissions::new(pre_granted)),
            files,
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory ports for tests

    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    pub struct FakePermissions {
        granted: Mutex<HashSet<Permission>>,
        blocked: Mutex<HashSet<Permission>>,
        requests: Mutex<usize>,
    }

    impl FakePermissions {
        pub fn granted(permissions: &[Permission]) -> Self {
            FakePermissions {
                granted: Mutex::new(permissions.iter().copied().collect()),
                blocked: Mutex::new(HashSet::new()),
                requests: Mutex::new(0),
            }
        }

        pub fn denied() -> Self {
            Self::granted(&[])
        }

        pub fn grant(&self, permission: Permission) {
            self.granted.lock().unwrap().insert(permission);
        }

        pub fn block(&self, permission: Permission) {
            self.blocked.lock().unwrap().insert(permission);
        }

        pub fn request_count(&self) -> usize {
            *self.requests.lock().unwrap()
        }
    }

    impl PermissionPort for FakePermissions {
        fn is_granted(&self, permission: Permission) -> bool {
            self.granted.lock().unwrap().contains(&permission)
        }

        fn request(&self, _permissions: &[Permission]) {
            *self.requests.lock().unwrap() += 1;
        }

        fn should_show_rationale(&self, permission: Permission) -> bool {
            !self.blocked.lock().unwrap().contains(&permission)
        }
    }

    /// Share port that accepts everything
    pub struct FakeShare;

    impl SharePort for FakeShare {
        fn send(&self, _request: &ShareRequest) -> Result<()> {
            Ok(())
        }
    }

    /// Camera that writes fixed bytes into the target, or reports a fixed outcome
    pub struct FakeCamera {
        pub files: Arc<FileProvider>,
        pub outcome: CaptureOutcome,
        pub bytes: Vec<u8>,
    }

    impl CameraPort for FakeCamera {
        fn capture(&self, output: &ContentUri) -> CaptureOutcome {
            if self.outcome == CaptureOutcome::Success {
                let target = match self.files.resolve(output) {
                    Ok(target) => target,
                    Err(e) => return CaptureOutcome::Failed(e.to_string()),
                };
                if let Err(e) = std::fs::write(target, &self.bytes) {
                    return CaptureOutcome::Failed(e.to_string());
                }
            }
            self.outcome.clone()
        }
    }
}
