//! Command reply lines
//!
//! Replies the host parses start with `$` like events. Bytes are written
//! as upper-case two-digit hex so the host can split on spaces.

use core::fmt;

/// Bytes per `$MEM` row
pub const MEM_ROW_LEN: usize = 16;

/// One `$MEM 0x<addr>: <bytes>` row
pub struct MemRow<'a> {
    pub addr: u16,
    pub bytes: &'a [u8],
}

impl fmt::Display for MemRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$MEM 0x{:02X}:", self.addr)?;
        for byte in self.bytes {
            write!(f, " {:02X}", byte)?;
        }
        Ok(())
    }
}

/// `$I2C devices: [0x20,0x3C] = 2`
pub struct I2cDevices<'a>(pub &'a [u8]);

impl fmt::Display for I2cDevices<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$I2C devices: [")?;
        for (i, addr) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "0x{:02X}", addr)?;
        }
        write!(f, "] = {}", self.0.len())
    }
}

/// `$States: FULL EMPTY EMPTY FULL`, one word per module
pub struct SensorStates(pub [bool; 4]);

impl fmt::Display for SensorStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$States:")?;
        for present in self.0 {
            f.write_str(if present { " FULL" } else { " EMPTY" })?;
        }
        Ok(())
    }
}

/// Confirmation for `time HH MM SS`
pub struct TimeSet {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl fmt::Display for TimeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Time set to {:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}
