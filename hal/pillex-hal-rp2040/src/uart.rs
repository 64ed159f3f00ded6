//! Serial port adapter
//!
//! Buffered UART halves from embassy-rp implement the embedded-io traits.
//! Receive never blocks: a byte is only read when the interrupt-filled
//! ring buffer already holds one.

use embedded_io::{Read, ReadReady, Write};
use pillex_hal::{UartRx, UartTx};

/// Wraps `BufferedUartRx`, `BufferedUartTx` or a whole `BufferedUart`
pub struct SerialPort<T> {
    inner: T,
}

impl<T> SerialPort<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T: Read + ReadReady> UartRx for SerialPort<T> {
    type Error = T::Error;

    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        if !self.inner.read_ready()? {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        match self.inner.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}

impl<T: Write> UartTx for SerialPort<T> {
    type Error = T::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()
    }
}
