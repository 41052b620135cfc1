/// Camera capture lifecycle
///
/// `Idle -> Requested(pending) -> Resolved(Success | Failure)`, and back to
/// `Requested` on the next capture. Only one capture may be pending.
use super::data::PhotoPath;
use crate::error::{GalleryError, Result};
use crate::platform::ContentUri;

/// What the camera reported for a capture request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Success,
    /// The user backed out of the camera
    Cancelled,
    Failed(String),
}

/// The target of an in-flight capture: a real, empty file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCapture {
    pub path: PhotoPath,
    pub uri: ContentUri,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureResolved {
    Success(PhotoPath),
    Failure {
        discarded: PhotoPath,
        reason: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Requested(PendingCapture),
    Resolved(CaptureResolved),
}

impl CaptureState {
    pub fn is_pending(&self) -> bool {
        matches!(self, CaptureState::Requested(_))
    }

    /// Fail early if a capture is already pending, before anything touches disk.
    pub fn ensure_ready(&self) -> Result<()> {
        if self.is_pending() {
            return Err(GalleryError::CaptureInProgress);
        }
        Ok(())
    }

    /// Move to `Requested`. Rejected while another capture is pending.
    pub fn request(&mut self, pending: PendingCapture) -> Result<()> {
        self.ensure_ready()?;
        *self = CaptureState::Requested(pending);
        Ok(())
    }

    /// Resolve the pending capture with the camera's outcome.
    ///
    /// Returns `None` when nothing was pending (a stray result); the state is
    /// left untouched in that case.
    pub fn resolve(&mut self, outcome: CaptureOutcome) -> Option<CaptureResolved> {
        if !self.is_pending() {
            return None;
        }
        let CaptureState::Requested(pending) = std::mem::take(self) else {
            return None;
        };

        let resolved = match outcome {
            CaptureOutcome::Success => CaptureResolved::Success(pending.path),
            CaptureOutcome::Cancelled => CaptureResolved::Failure {
                discarded: pending.path,
                reason: None,
            },
            CaptureOutcome::Failed(reason) => CaptureResolved::Failure {
                discarded: pending.path,
                reason: Some(reason),
            },
        };

        *self = CaptureState::Resolved(resolved.clone());
        Some(resolved)
    }
}
