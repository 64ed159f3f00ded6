//! I2C bus scanner
//!
//! An address is present when a one-byte read is acknowledged.

use pillex_core::traits::BusScanner;
use pillex_hal::I2cBus;

pub struct I2cScanner<I> {
    i2c: I,
}

impl<I: I2cBus> I2cScanner<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }
}

impl<I: I2cBus> BusScanner for I2cScanner<I> {
    fn probe(&mut self, addr: u8) -> bool {
        let mut buf = [0u8; 1];
        self.i2c.read(addr, &mut buf).is_ok()
    }
}
