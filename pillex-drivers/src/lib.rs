//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in pillex-core and pillex-display, all on top of the pillex-hal I2C
//! bus:
//!
//! - [`mcp23017`]: 16-line I/O expander carrying the cartridge motors,
//!   vibrators and chamber sensors
//! - [`at24`]: AT24Cxx EEPROM used as the cartridge store
//! - [`scanner`]: I2C address probing for the `i2c` command
//! - [`display`]: SH1106 128x64 OLED panel

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod at24;
pub mod display;
pub mod mcp23017;
pub mod scanner;

#[cfg(test)]
mod testing;

pub use at24::At24;
pub use display::Sh1106;
pub use mcp23017::{ExpanderError, Mcp23017};
pub use scanner::I2cScanner;
