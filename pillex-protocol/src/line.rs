//! Line framing for the host link
//!
//! Bytes are fed one at a time from the UART. A carriage return or a line
//! feed terminates the line; empty lines (for example the `\n` of a
//! `\r\n` pair) are ignored.
//!
//! The buffer is bounded. Once it is full, further characters are dropped
//! until the next terminator, and the truncated line is delivered with
//! [`Line::was_truncated`] set.

use heapless::Vec;

/// Receive buffer capacity in bytes
pub const RX_LINE_CAPACITY: usize = 128;

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// A complete line received from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<const N: usize = RX_LINE_CAPACITY> {
    bytes: Vec<u8, N>,
    truncated: bool,
}

impl<const N: usize> Line<N> {
    /// Raw bytes of the line, without terminator
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The line as text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.bytes).ok()
    }

    /// True if characters beyond the capacity were dropped
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }
}

/// Non-blocking line accumulator
#[derive(Debug, Clone)]
pub struct LineBuffer<const N: usize = RX_LINE_CAPACITY> {
    buffer: Vec<u8, N>,
    overflowed: bool,
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LineBuffer<N> {
    /// Create an empty line buffer
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            overflowed: false,
        }
    }

    /// Discard any partial line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
    }

    /// Number of bytes of the current partial line
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a single byte
    ///
    /// Returns `Some(line)` when a terminator completes a non-empty line.
    pub fn feed(&mut self, byte: u8) -> Option<Line<N>> {
        match byte {
            CR | LF => {
                if self.buffer.is_empty() {
                    self.overflowed = false;
                    return None;
                }
                let line = Line {
                    bytes: self.buffer.clone(),
                    truncated: self.overflowed,
                };
                self.reset();
                Some(line)
            }
            _ => {
                if self.buffer.push(byte).is_err() {
                    self.overflowed = true;
                }
                None
            }
        }
    }
}
