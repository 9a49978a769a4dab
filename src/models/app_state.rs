use super::camera::{CameraState, DevicePosition};
use super::capture_count::CaptureCount;
use super::history::RecentPhotosHistory;
use super::image::Image;
use super::permission::PermissionStatus;
use std::fmt;

/// The screen the workflow is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Splash,
    PermissionGate,
    Home,
    Capturing,
    /// Single captured photo awaiting save or discard.
    PhotoReview,
    GalleryPicking,
    /// Four-slot grid with drag-to-reorder.
    Reviewing,
    Processing,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::Splash => "splash",
            Screen::PermissionGate => "permission gate",
            Screen::Home => "home",
            Screen::Capturing => "capturing",
            Screen::PhotoReview => "photo review",
            Screen::GalleryPicking => "gallery picking",
            Screen::Reviewing => "reviewing",
            Screen::Processing => "processing",
        };
        f.write_str(name)
    }
}

/// Where the images of a processing job came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOrigin {
    Camera,
    Gallery,
}

/// Four ordered images handed to the processing stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingJob {
    pub origin: JobOrigin,
    pub images: [Image; 4],
}

/// A user-facing message raised by the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    /// Offer a shortcut to the system settings page.
    pub offers_settings: bool,
}

impl Alert {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offers_settings: false,
        }
    }

    pub fn settings_redirect(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offers_settings: true,
        }
    }
}

/// Grid contents while on the reorder screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewGrid {
    pub slots: [Image; 4],
    pub drag_source: Option<usize>,
    pub drop_target: Option<usize>,
}

/// Observable snapshot of the whole workflow.
///
/// Owned by [`crate::state::StateManager`]; the workflow actor is the only
/// writer, everything else reads snapshots or subscribes to
/// [`crate::state::StateChange`] events.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub screen: Screen,

    // Camera
    pub camera_state: CameraState,
    pub camera_position: DevicePosition,

    // Capture session
    pub capture_count: CaptureCount,
    pub session_photos: Vec<Image>,
    pub pending_photo: Option<Image>,

    // Gallery path
    pub review_grid: Option<ReviewGrid>,

    // Results
    pub history: RecentPhotosHistory,
    pub last_job: Option<ProcessingJob>,
    pub completed_jobs: usize,

    // Permissions as last observed
    pub camera_permission: Option<PermissionStatus>,
    pub library_permission: Option<PermissionStatus>,

    pub alert: Option<Alert>,
}

impl AppState {
    /// Drop everything belonging to the current four-photo session.
    pub fn reset_session(&mut self) {
        self.capture_count.reset();
        self.session_photos.clear();
        self.pending_photo = None;
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.screen, Screen::Processing | Screen::GalleryPicking)
            || matches!(
                self.camera_state,
                CameraState::Countdown(_) | CameraState::Capturing | CameraState::Configuring
            )
    }
}
