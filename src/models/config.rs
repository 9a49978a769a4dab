use super::camera::{DevicePosition, FlashMode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Countdown lengths offered by the settings sheet.
pub const COUNTDOWN_CHOICES: [u32; 3] = [3, 5, 10];

/// Booth configuration from My4Cuts Config.yaml
///
/// Every field has a default so a missing or partial file still loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoothConfig {
    #[serde(default)]
    pub booth: BoothSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoothSettings {
    /// How long the splash screen stays up before the permission gate.
    pub splash_delay_ms: u64,

    /// Whether the shutter waits for a countdown.
    pub countdown_enabled: bool,

    /// Countdown length; one of [`COUNTDOWN_CHOICES`].
    pub countdown_seconds: u32,

    /// Interval between countdown ticks.
    pub countdown_interval_ms: u64,

    /// Simulated compositing time.
    pub processing_delay_ms: u64,

    pub default_camera: DevicePosition,

    pub flash_mode: FlashMode,

    /// Maximum gallery selection, 1..=4.
    pub max_selection: usize,

    pub debug_mode: bool,
}

impl Default for BoothSettings {
    fn default() -> Self {
        Self {
            splash_delay_ms: 2000,
            countdown_enabled: true,
            countdown_seconds: 3,
            countdown_interval_ms: 1000,
            processing_delay_ms: 2000,
            default_camera: DevicePosition::Back,
            flash_mode: FlashMode::Auto,
            max_selection: 4,
            debug_mode: false,
        }
    }
}

impl BoothSettings {
    /// Replace out-of-range values with usable ones, logging each fix.
    pub fn validated(mut self) -> Self {
        if !COUNTDOWN_CHOICES.contains(&self.countdown_seconds) {
            tracing::warn!(
                "Countdown of {}s is not one of {:?}, using 3s",
                self.countdown_seconds,
                COUNTDOWN_CHOICES
            );
            self.countdown_seconds = 3;
        }

        let clamped = self.max_selection.clamp(1, 4);
        if clamped != self.max_selection {
            tracing::warn!(
                "Max selection {} out of range, using {}",
                self.max_selection,
                clamped
            );
            self.max_selection = clamped;
        }

        self
    }

    pub fn splash_delay(&self) -> Duration {
        Duration::from_millis(self.splash_delay_ms)
    }

    pub fn countdown_interval(&self) -> Duration {
        Duration::from_millis(self.countdown_interval_ms)
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }
}
