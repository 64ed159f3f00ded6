//! Time abstractions
//!
//! All timed behavior in the control plane is "elapsed since a recorded
//! timestamp" against a monotonic millisecond clock. Timestamps are `u32`
//! and wrap after ~49 days; always compare them with [`elapsed_ms`].

/// Monotonic millisecond clock
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin (usually boot)
    fn now_ms(&self) -> u32;
}

/// Short blocking delay
///
/// Only used for bounded hardware waits (EEPROM write commit).
pub trait DelayMs {
    /// Block for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

/// Milliseconds elapsed from `since` to `now`, robust to counter wrap
#[inline]
pub fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}
