use serde::{Deserialize, Serialize};
use std::fmt;

/// A protected platform resource the booth needs access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Camera,
    Library,
}

impl Resource {
    /// Key used for the persisted "previously denied" flag.
    pub fn denial_key(self) -> &'static str {
        match self {
            Resource::Camera => "CameraPermissionDenied",
            Resource::Library => "PhotoPermissionDenied",
        }
    }

    /// User-facing explanation shown when access is missing.
    pub fn denied_message(self) -> &'static str {
        match self {
            Resource::Camera => {
                "Camera access is off, so photos cannot be taken. Enable it in Settings."
            }
            Resource::Library => {
                "Photo library access is off, so photos cannot be picked. Enable it in Settings."
            }
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Camera => write!(f, "camera"),
            Resource::Library => write!(f, "photo library"),
        }
    }
}

/// Raw authorization value as reported by the platform permission subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformAuthorization {
    Authorized,
    /// Partial library access; treated as granted.
    Limited,
    Denied,
    Restricted,
    NotDetermined,
    /// A value this build does not recognize.
    Unknown(i32),
}

/// Tri-state permission as seen by the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    Undetermined,
    Granted,
    Denied,
}

impl PermissionStatus {
    /// Map a platform value, returning `None` for values outside the
    /// recognized set.
    pub fn from_platform(raw: PlatformAuthorization) -> Option<Self> {
        match raw {
            PlatformAuthorization::Authorized | PlatformAuthorization::Limited => {
                Some(PermissionStatus::Granted)
            }
            PlatformAuthorization::Denied | PlatformAuthorization::Restricted => {
                Some(PermissionStatus::Denied)
            }
            PlatformAuthorization::NotDetermined => Some(PermissionStatus::Undetermined),
            PlatformAuthorization::Unknown(_) => None,
        }
    }

    pub fn is_determined(self) -> bool {
        self != PermissionStatus::Undetermined
    }
}
