//! Heartbeat monitor
//!
//! The host proves it is alive by sending `time` at least once per
//! liveness window. Independently the device emits a `$time` beacon
//! every beacon interval.
//!
//! Silence for the whole window latches a fault once; the fault stays
//! latched, and is not reported again, until the next `time` command.

use pillex_hal::time::elapsed_ms;

use crate::config::TimingConfig;

/// Liveness condition status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LivenessStatus {
    /// Host heard from within the window
    Ok,
    /// Window just expired; reported once per silence episode
    Lost,
    /// Still silent, already reported
    Latched,
}

/// Host liveness tracking
#[derive(Debug, Clone)]
pub struct HeartbeatMonitor {
    beacon_interval_ms: u32,
    liveness_timeout_ms: u32,
    /// Last `time` command (or boot)
    last_host_at: u32,
    /// Last `$time` beacon (or boot)
    last_beacon_at: u32,
    fault_latched: bool,
}

impl HeartbeatMonitor {
    /// Create a monitor whose windows start at `now`
    pub fn new(timing: &TimingConfig, now: u32) -> Self {
        Self {
            beacon_interval_ms: timing.beacon_interval_ms,
            liveness_timeout_ms: timing.liveness_timeout_ms,
            last_host_at: now,
            last_beacon_at: now,
            fault_latched: false,
        }
    }

    /// Restart both windows, as at boot
    pub fn reset(&mut self, now: u32) {
        self.last_host_at = now;
        self.last_beacon_at = now;
        self.fault_latched = false;
    }

    /// Record a `time` command
    ///
    /// Returns true if this ends a latched silence episode.
    pub fn host_seen(&mut self, now: u32) -> bool {
        self.last_host_at = now;
        core::mem::replace(&mut self.fault_latched, false)
    }

    /// Returns the beacon timestamp when a beacon is due
    pub fn beacon_due(&mut self, now: u32) -> Option<u32> {
        if elapsed_ms(now, self.last_beacon_at) >= self.beacon_interval_ms {
            self.last_beacon_at = now;
            Some(now)
        } else {
            None
        }
    }

    /// Evaluate host liveness
    pub fn check(&mut self, now: u32) -> LivenessStatus {
        if self.fault_latched {
            return LivenessStatus::Latched;
        }
        if elapsed_ms(now, self.last_host_at) >= self.liveness_timeout_ms {
            self.fault_latched = true;
            return LivenessStatus::Lost;
        }
        LivenessStatus::Ok
    }

    pub fn is_fault_latched(&self) -> bool {
        self.fault_latched
    }

    /// Milliseconds since the host was last heard from
    pub fn silence_ms(&self, now: u32) -> u32 {
        elapsed_ms(now, self.last_host_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> HeartbeatMonitor {
        HeartbeatMonitor::new(&TimingConfig::default(), 0)
    }

    #[test]
    fn test_beacon_every_interval() {
        let mut hb = monitor();
        assert_eq!(hb.beacon_due(9_999), None);
        assert_eq!(hb.beacon_due(10_000), Some(10_000));
        assert_eq!(hb.beacon_due(19_999), None);
        assert_eq!(hb.beacon_due(20_003), Some(20_003));
    }

    #[test]
    fn test_host_keeps_link_alive() {
        let mut hb = monitor();
        for t in (0..300_000).step_by(30_000) {
            assert!(!hb.host_seen(t));
            assert_eq!(hb.check(t + 29_999), LivenessStatus::Ok);
        }
    }

    #[test]
    fn test_silence_reported_once() {
        let mut hb = monitor();
        assert_eq!(hb.check(59_999), LivenessStatus::Ok);
        assert_eq!(hb.check(60_000), LivenessStatus::Lost);
        assert_eq!(hb.check(60_001), LivenessStatus::Latched);
        assert_eq!(hb.check(500_000), LivenessStatus::Latched);
        assert!(hb.is_fault_latched());
    }

    #[test]
    fn test_time_command_ends_episode() {
        let mut hb = monitor();
        hb.check(60_000);
        assert!(hb.host_seen(70_000));
        assert!(!hb.is_fault_latched());
        assert_eq!(hb.check(129_999), LivenessStatus::Ok);
        assert_eq!(hb.check(130_000), LivenessStatus::Lost);
    }

    #[test]
    fn test_beacon_independent_of_host() {
        let mut hb = monitor();
        hb.host_seen(5_000);
        assert_eq!(hb.beacon_due(10_000), Some(10_000));
    }

    #[test]
    fn test_windows_survive_wrap() {
        let start = u32::MAX - 1_000;
        let mut hb = HeartbeatMonitor::new(&TimingConfig::default(), start);
        assert_eq!(hb.check(start.wrapping_add(59_999)), LivenessStatus::Ok);
        assert_eq!(hb.check(start.wrapping_add(60_000)), LivenessStatus::Lost);
        assert_eq!(hb.silence_ms(start.wrapping_add(60_000)), 60_000);
    }
}
