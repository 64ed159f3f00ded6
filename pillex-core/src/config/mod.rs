//! Configuration types
//!
//! Every timing constant and bus address the control plane uses lives
//! here. `Default` gives the values the dispenser ships with; the firmware
//! overlays its `device.toml` on top.

pub mod hardware;
pub mod timing;

pub use hardware::*;
pub use timing::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Complete device configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    pub timing: TimingConfig,
    pub hardware: HardwareConfig,
}

impl DeviceConfig {
    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing.validate()?;
        self.hardware.validate()
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Vibrate schedule boundaries are not strictly increasing
    VibrateScheduleOrder,
    /// A duration that must be non-zero is zero
    ZeroDuration,
    /// Retry budget above the supported maximum
    TooManyRetries,
    /// Liveness timeout not longer than the beacon interval
    LivenessTooShort,
    /// Address outside the 7-bit range or reserved
    InvalidAddress,
    /// Persistent store size is zero
    InvalidStoreSize,
}
