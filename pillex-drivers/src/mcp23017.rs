//! MCP23017 16-bit I/O expander
//!
//! Port A carries lines 0-7 and port B lines 8-15. The chip powers up
//! with IOCON.BANK = 0, so each A/B register pair is adjacent and a
//! single write of `[reg, a, b]` updates both ports.
//!
//! Direction and output latch are shadowed locally so a single line can
//! be changed without reading the chip back.

use pillex_core::traits::{ExpanderPort, EXPANDER_PINS};
use pillex_hal::{Direction, I2cBus, Level};

/// Register addresses (BANK = 0, port A)
mod reg {
    pub const IODIR: u8 = 0x00;
    pub const IPOL: u8 = 0x02;
    pub const GPPU: u8 = 0x0C;
    pub const GPIO: u8 = 0x12;
    pub const OLAT: u8 = 0x14;
}

/// Expander errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExpanderError {
    /// Bus transaction failed
    Bus,
    /// Line number outside 0..16
    InvalidPin,
}

/// MCP23017 driver
pub struct Mcp23017<I> {
    i2c: I,
    address: u8,
    /// Shadow of IODIR (1 = input); all inputs at power-up
    iodir: u16,
    /// Shadow of OLAT
    olat: u16,
}

impl<I: I2cBus> Mcp23017<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Self {
            i2c,
            address,
            iodir: 0xFFFF,
            olat: 0,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Output latch as last written
    pub fn outputs(&self) -> u16 {
        self.olat
    }

    /// Enable the internal 100k pull-ups on the lines set in `mask`
    pub fn set_pullups(&mut self, mask: u16) -> Result<(), ExpanderError> {
        self.write_pair(reg::GPPU, mask)
    }

    /// Read both ports
    pub fn read_all(&mut self) -> Result<u16, ExpanderError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg::GPIO], &mut buf)
            .map_err(|_| ExpanderError::Bus)?;
        Ok(u16::from_le_bytes(buf))
    }

    pub fn release(self) -> I {
        self.i2c
    }

    fn write_pair(&mut self, register: u8, value: u16) -> Result<(), ExpanderError> {
        let [a, b] = value.to_le_bytes();
        self.i2c
            .write(self.address, &[register, a, b])
            .map_err(|_| ExpanderError::Bus)
    }
}

fn bit(pin: u8) -> Result<u16, ExpanderError> {
    if pin < EXPANDER_PINS {
        Ok(1 << pin)
    } else {
        Err(ExpanderError::InvalidPin)
    }
}

impl<I: I2cBus> ExpanderPort for Mcp23017<I> {
    type Error = ExpanderError;

    fn configure(&mut self, pin: u8, direction: Direction) -> Result<(), ExpanderError> {
        let mask = bit(pin)?;
        let iodir = match direction {
            Direction::Input => self.iodir | mask,
            Direction::Output => self.iodir & !mask,
        };
        self.write_pair(reg::IODIR, iodir)?;
        self.iodir = iodir;
        Ok(())
    }

    fn set_polarity(&mut self, mask: u16) -> Result<(), ExpanderError> {
        self.write_pair(reg::IPOL, mask)
    }

    fn write_all(&mut self, mask: u16) -> Result<(), ExpanderError> {
        self.write_pair(reg::OLAT, mask)?;
        self.olat = mask;
        Ok(())
    }

    fn write(&mut self, pin: u8, level: Level) -> Result<(), ExpanderError> {
        let mask = bit(pin)?;
        let olat = match level {
            Level::High => self.olat | mask,
            Level::Low => self.olat & !mask,
        };
        self.write_all(olat)
    }

    fn read(&mut self, pin: u8) -> Result<Level, ExpanderError> {
        let mask = bit(pin)?;
        Ok(Level::from(self.read_all()? & mask != 0))
    }
}
