use serde::{Deserialize, Serialize};
use std::fmt;

/// Which physical sensor a capture session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePosition {
    #[default]
    Back,
    Front,
}

impl DevicePosition {
    pub fn opposite(self) -> Self {
        match self {
            DevicePosition::Back => DevicePosition::Front,
            DevicePosition::Front => DevicePosition::Back,
        }
    }
}

impl fmt::Display for DevicePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DevicePosition::Back => write!(f, "back"),
            DevicePosition::Front => write!(f, "front"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    #[default]
    Auto,
    On,
    Off,
}

/// Per-shot settings handed to the camera backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureSettings {
    pub flash_mode: FlashMode,
}

/// Lifecycle of the camera session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraState {
    #[default]
    Idle,
    Configuring,
    Running,
    /// Countdown in progress; holds the value currently displayed.
    Countdown(u32),
    Capturing,
    Error,
}

impl CameraState {
    /// Whether the shutter can be pressed.
    pub fn is_ready(self) -> bool {
        self == CameraState::Running
    }
}
