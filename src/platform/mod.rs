//! Platform capability seams.
//!
//! The workflow never talks to OS APIs directly. Each capability it needs is
//! a trait here, implemented by the host application:
//!
//! - [`PermissionPlatform`]: authorization status and the system prompt
//! - [`CameraBackend`]: the physical camera session
//! - [`AssetPicker`]: the photo library: multi-select picker, asset decoder
//!   and album writes
//!
//! Async methods return `impl Future + Send` so the workflow actor can run
//! on a multi-threaded runtime. [`simulated`] provides in-process
//! implementations used by the headless binary and the tests.

pub mod simulated;

use crate::error::BoothError;
use crate::models::{CaptureSettings, DevicePosition, Image, PlatformAuthorization, Resource};
use std::future::Future;
use thiserror::Error;

/// Access to the platform permission subsystem.
pub trait PermissionPlatform: Send + Sync {
    fn authorization_status(&self, resource: Resource) -> PlatformAuthorization;

    /// Show the system prompt and resolve once the user answers.
    fn request_authorization(
        &self,
        resource: Resource,
    ) -> impl Future<Output = PlatformAuthorization> + Send;
}

/// Faults reported by a [`CameraBackend`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraFault {
    #[error("no {0} camera on this device")]
    NoDevice(DevicePosition),

    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Capture(String),

    #[error("photo data could not be processed")]
    UndecodableData,
}

impl From<CameraFault> for BoothError {
    fn from(fault: CameraFault) -> Self {
        match fault {
            CameraFault::NoDevice(position) => BoothError::DeviceUnavailable(position),
            CameraFault::Configuration(message) => BoothError::SessionConfiguration(message),
            CameraFault::Capture(message) => BoothError::CaptureFailed(message),
            CameraFault::UndecodableData => BoothError::CaptureFailed(fault.to_string()),
        }
    }
}

/// The physical camera session.
pub trait CameraBackend: Send + Sync + 'static {
    /// Detach any existing input and attach the sensor at `position`.
    fn configure(&self, position: DevicePosition) -> Result<(), CameraFault>;

    /// Start streaming. Blocks while the hardware spins up.
    fn start_running(&self);

    fn stop_running(&self);

    fn capture_still(
        &self,
        settings: CaptureSettings,
    ) -> impl Future<Output = Result<Image, CameraFault>> + Send;
}

/// Opaque reference to a picked asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetRef(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickerConfig {
    pub max_selection: usize,
    /// Report assets in the order the user tapped them.
    pub ordered: bool,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            max_selection: 4,
            ordered: true,
        }
    }
}

/// The system photo library.
pub trait AssetPicker: Send + Sync {
    /// Present the picker. `None` means the user dismissed it.
    fn present(&self, config: PickerConfig) -> impl Future<Output = Option<Vec<AssetRef>>> + Send;

    /// Decode one picked asset.
    fn load_image(&self, asset: &AssetRef) -> impl Future<Output = Result<Image, String>> + Send;

    /// Write a captured photo to the user's album.
    fn save_to_library(&self, image: &Image) -> impl Future<Output = Result<(), String>> + Send;
}

/// The platform implementations a workflow is built from.
pub struct Platform<P, C, A> {
    pub permissions: P,
    pub camera: C,
    pub picker: A,
}
