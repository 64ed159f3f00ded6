//! AT24Cxx serial EEPROM
//!
//! Parts up to 16 Kbit (2048 bytes) take a one-byte word address and put
//! the upper address bits into the low bits of the device address. Larger
//! parts take a two-byte big-endian word address.
//!
//! Writes never cross a page boundary and wait out the internal write
//! cycle before returning.

use pillex_core::traits::{PersistentStore, STORE_SENTINEL};
use pillex_hal::{DelayMs, I2cBus};

/// Internal write cycle time (tWR) in ms
pub const WRITE_CYCLE_MS: u32 = 5;

/// Largest part that uses one-byte word addressing
const SMALL_PART_LIMIT: u16 = 2048;

/// Largest page of any supported part
const MAX_PAGE: usize = 64;

/// AT24Cxx driver
pub struct At24<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    size: u16,
    page_size: u16,
    failures: u32,
}

impl<I: I2cBus, D: DelayMs> At24<I, D> {
    /// `page_size` is clamped to 1..=64
    pub fn new(i2c: I, delay: D, address: u8, size: u16, page_size: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            size,
            page_size: u16::from(page_size).clamp(1, MAX_PAGE as u16),
            failures: 0,
        }
    }

    /// Bus transactions that were not acknowledged
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Device address and word address bytes for `addr`
    fn target(&self, addr: u16) -> (u8, [u8; 2], usize) {
        let [hi, lo] = addr.to_be_bytes();
        if self.size > SMALL_PART_LIMIT {
            (self.address, [hi, lo], 2)
        } else {
            (self.address | (hi & 0x07), [lo, 0], 1)
        }
    }

    /// Sequential read starting at `addr`
    pub fn read(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), I::Error> {
        let (dev, word, len) = self.target(addr);
        self.i2c.write_read(dev, &word[..len], buf)
    }

    /// Write `data` starting at `addr`, one page write per page touched
    pub fn write(&mut self, addr: u16, data: &[u8]) -> Result<(), I::Error> {
        let mut addr = addr;
        let mut rest = data;
        while !rest.is_empty() {
            let room = usize::from(self.page_size - addr % self.page_size);
            let (chunk, tail) = rest.split_at(room.min(rest.len()));

            let (dev, word, len) = self.target(addr);
            let mut frame = [0u8; MAX_PAGE + 2];
            frame[..len].copy_from_slice(&word[..len]);
            frame[len..len + chunk.len()].copy_from_slice(chunk);
            self.i2c.write(dev, &frame[..len + chunk.len()])?;
            self.delay.delay_ms(WRITE_CYCLE_MS);

            addr = addr.wrapping_add(chunk.len() as u16);
            rest = tail;
        }
        Ok(())
    }

    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }
}

impl<I: I2cBus, D: DelayMs> PersistentStore for At24<I, D> {
    fn capacity(&self) -> u16 {
        self.size
    }

    fn read_byte(&mut self, addr: u16) -> u8 {
        let mut buf = [STORE_SENTINEL];
        if self.read(addr, &mut buf).is_err() {
            self.failures = self.failures.saturating_add(1);
            return STORE_SENTINEL;
        }
        buf[0]
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        if self.write(addr, &[value]).is_err() {
            self.failures = self.failures.saturating_add(1);
        }
    }
}
