//! Digital line expander
//!
//! Sixteen lines, grouped four per dispensing module. Line numbers run
//! 0..16; lines 0..8 are port A and 8..16 port B on an MCP23017.

use pillex_hal::{Direction, Level};

/// Number of lines on the expander
pub const EXPANDER_PINS: u8 = 16;

/// 16-line digital expander
pub trait ExpanderPort {
    /// Error type for bus operations
    type Error;

    /// Set the direction of one line
    fn configure(&mut self, pin: u8, direction: Direction) -> Result<(), Self::Error>;

    /// Set input polarity inversion, one bit per line
    fn set_polarity(&mut self, mask: u16) -> Result<(), Self::Error>;

    /// Drive all output lines at once, one bit per line
    fn write_all(&mut self, mask: u16) -> Result<(), Self::Error>;

    /// Drive a single output line
    fn write(&mut self, pin: u8, level: Level) -> Result<(), Self::Error>;

    /// Read a single line
    fn read(&mut self, pin: u8) -> Result<Level, Self::Error>;
}
