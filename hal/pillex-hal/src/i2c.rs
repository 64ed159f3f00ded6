//! I2C bus abstractions
//!
//! Provides traits for I2C master operations that can be implemented
//! by chip-specific HALs, plus [`BlockingI2c`], which presents any
//! embedded-hal master (or a shared-bus device handle) as an [`I2cBus`].

use embedded_hal::i2c::I2c;

/// I2C bus master
///
/// Provides basic I2C read/write operations for communicating with
/// peripheral devices.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write then read in a single transaction (repeated start)
    ///
    /// This is commonly used to write a register address then read data.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `write_data` - Bytes to write (typically register address)
    /// * `read_buf` - Buffer to read into
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}

impl<T: I2cBus + ?Sized> I2cBus for &mut T {
    type Error = T::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write(address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read(address, buf)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        (**self).write_read(address, write_data, read_buf)
    }
}

/// Wraps a blocking embedded-hal I2C master as an [`I2cBus`]
///
/// Works for a chip HAL's master directly, or for one device handle on a
/// shared bus such as `embedded_hal_bus::i2c::RefCellDevice`.
pub struct BlockingI2c<T> {
    inner: T,
}

impl<T: I2c> BlockingI2c<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T: I2c> I2cBus for BlockingI2c<T> {
    type Error = T::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write(address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.inner.read(address, buf)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.inner.write_read(address, write_data, read_buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use embedded_hal::i2c::{ErrorType, Operation};
    use embedded_hal_bus::i2c::RefCellDevice;

    /// Master that counts operations and answers reads with a fixed byte
    struct CountingMaster {
        writes: usize,
        reads: usize,
        last_address: u8,
    }

    impl ErrorType for CountingMaster {
        type Error = Infallible;
    }

    impl I2c for CountingMaster {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Infallible> {
            self.last_address = address;
            for op in operations {
                match op {
                    Operation::Write(_) => self.writes += 1,
                    Operation::Read(buf) => {
                        self.reads += 1;
                        buf.fill(0xA5);
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_devices_share_one_master() {
        let bus = RefCell::new(CountingMaster {
            writes: 0,
            reads: 0,
            last_address: 0,
        });
        let mut expander = BlockingI2c::new(RefCellDevice::new(&bus));
        let mut eeprom = BlockingI2c::new(RefCellDevice::new(&bus));

        expander.write(0x20, &[0x00, 0xFF]).unwrap();
        let mut buf = [0u8; 2];
        eeprom.write_read(0x50, &[0x00], &mut buf).unwrap();

        assert_eq!(buf, [0xA5, 0xA5]);
        assert_eq!(bus.borrow().writes, 2);
        assert_eq!(bus.borrow().reads, 1);
        assert_eq!(bus.borrow().last_address, 0x50);
    }

    #[test]
    fn test_mut_ref_forwards() {
        let mut master = BlockingI2c::new(CountingMaster {
            writes: 0,
            reads: 0,
            last_address: 0,
        });
        let mut buf = [0u8; 1];
        (&mut master).read(0x3C, &mut buf).unwrap();
        assert_eq!(buf, [0xA5]);
        assert_eq!(master.inner.reads, 1);
    }
}
