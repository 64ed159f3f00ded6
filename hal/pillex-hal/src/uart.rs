//! UART serial communication abstractions
//!
//! The host link is drained byte by byte from the poll loop, so reception
//! is non-blocking. Transmission may block for as long as the hardware
//! FIFO needs to accept the bytes.

use core::fmt;

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write all bytes to the UART
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read one byte if one is already available
    ///
    /// Returns `Ok(None)` immediately when the receive buffer is empty.
    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

/// Adapter exposing a [`UartTx`] as a [`core::fmt::Write`] sink
///
/// Transmit errors are reported as [`fmt::Error`]; callers that do not
/// care about a lost status line simply ignore the result.
pub struct TxWriter<'a, T> {
    tx: &'a mut T,
}

impl<'a, T: UartTx> TxWriter<'a, T> {
    pub fn new(tx: &'a mut T) -> Self {
        Self { tx }
    }
}

impl<'a, T: UartTx> fmt::Write for TxWriter<'a, T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.tx.write_blocking(s.as_bytes()).map_err(|_| fmt::Error)
    }
}
