//! Data models for the my4cuts booth.
//!
//! - [`AppState`]: observable snapshot of the workflow (screen, camera, session, history)
//! - [`Image`]: opaque shared bitmap handle
//! - [`RecentPhotosHistory`]: most-recent-first strip of saved photos (max 4)
//! - [`CaptureCount`]: accepted-photo counter for one four-photo session
//! - [`PermissionStatus`] / [`Resource`]: tri-state authorization per resource
//! - [`BoothConfig`]: settings loaded from `My4Cuts Config.yaml`
//!
//! State updates go through [`StateManager`](crate::state::StateManager) so
//! observers receive change events.

pub mod app_state;
pub mod camera;
pub mod capture_count;
pub mod config;
pub mod history;
pub mod image;
pub mod permission;

pub use app_state::{Alert, AppState, JobOrigin, ProcessingJob, ReviewGrid, Screen};
pub use camera::{CameraState, CaptureSettings, DevicePosition, FlashMode};
pub use capture_count::{CaptureCount, CountProgress, PHOTOS_PER_SESSION};
pub use config::{BoothConfig, BoothSettings, COUNTDOWN_CHOICES};
pub use history::{RECENT_PHOTOS_CAPACITY, RecentPhotosHistory};
pub use image::Image;
pub use permission::{PermissionStatus, PlatformAuthorization, Resource};
