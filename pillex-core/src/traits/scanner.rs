//! Bus diagnostics

/// Probe for devices on the I2C bus
pub trait BusScanner {
    /// True if a device acknowledges `addr`
    fn probe(&mut self, addr: u8) -> bool;
}
