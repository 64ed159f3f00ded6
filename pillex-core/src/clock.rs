//! 1 Hz wall clock
//!
//! Time of day as set by the host. Whole seconds are taken from the
//! monotonic clock, so a late tick catches up instead of drifting.

use pillex_hal::time::elapsed_ms;

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Time of day, HH:MM:SS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeOfDay {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl TimeOfDay {
    fn from_seconds(total: u32) -> Self {
        let total = total % SECONDS_PER_DAY;
        Self {
            hours: (total / 3600) as u8,
            minutes: (total / 60 % 60) as u8,
            seconds: (total % 60) as u8,
        }
    }

    fn to_seconds(self) -> u32 {
        u32::from(self.hours) * 3600 + u32::from(self.minutes) * 60 + u32::from(self.seconds)
    }
}

/// Wall clock advanced once per second from the poll loop
#[derive(Debug, Clone, Default)]
pub struct WallClock {
    time: TimeOfDay,
    last_tick_at: u32,
}

impl WallClock {
    pub fn new(now: u32) -> Self {
        Self {
            time: TimeOfDay::default(),
            last_tick_at: now,
        }
    }

    pub fn time(&self) -> TimeOfDay {
        self.time
    }

    /// Set the time of day; the next second starts at `now`
    pub fn set(&mut self, time: TimeOfDay, now: u32) {
        self.time = time;
        self.last_tick_at = now;
    }

    /// Advance by every whole second elapsed; true if the time changed
    pub fn tick(&mut self, now: u32) -> bool {
        let seconds = elapsed_ms(now, self.last_tick_at) / 1000;
        if seconds == 0 {
            return false;
        }
        self.last_tick_at = self.last_tick_at.wrapping_add(seconds * 1000);
        self.time = TimeOfDay::from_seconds(self.time.to_seconds() + seconds % SECONDS_PER_DAY);
        true
    }
}
