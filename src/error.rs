use crate::models::{DevicePosition, Resource, Screen};
use thiserror::Error;

/// Errors surfaced by the booth components and the workflow.
///
/// None of these are fatal: the workflow turns each into an
/// [`Alert`](crate::models::Alert) and falls back to the nearest stable state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoothError {
    #[error("Cannot access the {0} camera")]
    DeviceUnavailable(DevicePosition),

    #[error("Camera initialization failed: {0}")]
    SessionConfiguration(String),

    #[error("Photo capture failed: {0}")]
    CaptureFailed(String),

    #[error("Capture cancelled before the shutter fired")]
    CaptureCancelled,

    #[error("Camera is not ready")]
    CameraNotReady,

    #[error("No {0} permission")]
    PermissionDenied(Resource),

    #[error("Could not save the photo to the library: {0}")]
    LibrarySaveFailed(String),

    #[error("Asset {index} could not be decoded: {reason}")]
    AssetDecodeFailed { index: usize, reason: String },

    #[error("Cannot {command} while on the {screen} screen")]
    InvalidTransition { screen: Screen, command: &'static str },

    #[error("Workflow has shut down")]
    WorkflowClosed,
}

pub type BoothResult<T> = std::result::Result<T, BoothError>;
