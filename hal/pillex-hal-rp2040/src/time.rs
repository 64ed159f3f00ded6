//! Time from the embassy time driver

use embassy_time::{block_for, Duration, Instant};
use pillex_hal::{Clock, DelayMs};

/// Milliseconds since boot, truncated to `u32`
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}

/// Busy-wait delay
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyDelay;

impl DelayMs for EmbassyDelay {
    fn delay_ms(&mut self, ms: u32) {
        block_for(Duration::from_millis(u64::from(ms)));
    }
}
