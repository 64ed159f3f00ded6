//! Timing configuration
//!
//! All durations are milliseconds measured from a recorded timestamp on
//! the monotonic clock, never tick counts.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Upper bound for `max_retries`
pub const RETRY_LIMIT: u8 = 5;

/// Timing of the drop, button, screen and heartbeat state machines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingConfig {
    /// Slider close and open drive time
    pub slider_ms: u32,
    /// Vibrator switches off at this offset into VibrateRetry
    pub vibrate_on_ms: u32,
    /// Slider-close nudge starts at this offset
    pub nudge_start_ms: u32,
    /// Nudge stops at this offset
    pub nudge_stop_ms: u32,
    /// VibrateRetry ends and the sensor is checked again
    pub vibrate_cycle_ms: u32,
    /// Vibrate retries before the slider is opened regardless
    pub max_retries: u8,
    /// Reserved post-retry offset; accepted and stored but never applied
    pub post_retry_offset_ms: u32,
    /// Stable time before a button level is committed
    pub debounce_ms: u32,
    /// Hold time for a long press
    pub long_press_ms: u32,
    /// Success screen reverts to Time after this long
    pub success_timeout_ms: u32,
    /// Interval of the `$time` beacon
    pub beacon_interval_ms: u32,
    /// Host silence before the liveness fault
    pub liveness_timeout_ms: u32,
    /// Screen refresh interval
    pub refresh_ms: u32,
    /// Screen refresh interval while Loading is animated
    pub loading_refresh_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            slider_ms: 250,
            vibrate_on_ms: 400,
            nudge_start_ms: 500,
            nudge_stop_ms: 600,
            vibrate_cycle_ms: 700,
            max_retries: RETRY_LIMIT,
            post_retry_offset_ms: 0,
            debounce_ms: 50,
            long_press_ms: 1000,
            success_timeout_ms: 5000,
            beacon_interval_ms: 10_000,
            liveness_timeout_ms: 60_000,
            refresh_ms: 250,
            loading_refresh_ms: 16,
        }
    }
}

impl TimingConfig {
    /// Check ordering and range constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slider_ms == 0 || self.long_press_ms == 0 || self.beacon_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        let schedule = [
            self.vibrate_on_ms,
            self.nudge_start_ms,
            self.nudge_stop_ms,
            self.vibrate_cycle_ms,
        ];
        if self.vibrate_on_ms == 0 || schedule.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::VibrateScheduleOrder);
        }
        if self.max_retries > RETRY_LIMIT {
            return Err(ConfigError::TooManyRetries);
        }
        if self.liveness_timeout_ms <= self.beacon_interval_ms {
            return Err(ConfigError::LivenessTooShort);
        }
        Ok(())
    }
}
