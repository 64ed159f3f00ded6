//! RP2040-specific HAL for the pill dispenser firmware
//!
//! This crate provides RP2040 implementations of the shared `pillex-hal`
//! traits on top of embassy-rp peripherals:
//!
//! - [`uart::SerialPort`]: buffered UART halves as non-blocking
//!   [`pillex_hal::UartRx`] / [`pillex_hal::UartTx`]
//! - [`gpio::Button`]: pulled-up input pin
//! - [`time::EmbassyClock`], [`time::EmbassyDelay`]: monotonic time and
//!   short blocking waits from the embassy time driver

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod time;
pub mod uart;

pub use gpio::Button;
pub use time::{EmbassyClock, EmbassyDelay};
pub use uart::SerialPort;
