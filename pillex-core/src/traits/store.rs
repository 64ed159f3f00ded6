//! Byte-addressable persistent store

/// Value returned for reads the device does not answer
pub const STORE_SENTINEL: u8 = 0xFF;

/// Byte-addressable non-volatile memory
///
/// Reads never fail: an unresponsive device reads as [`STORE_SENTINEL`].
/// A write returns once the device has committed the byte, so the next
/// operation may proceed immediately.
pub trait PersistentStore {
    /// Size of the store in bytes
    fn capacity(&self) -> u16;

    /// Read one byte
    fn read_byte(&mut self, addr: u16) -> u8;

    /// Write one byte and wait for the commit
    fn write_byte(&mut self, addr: u16, value: u8);
}
