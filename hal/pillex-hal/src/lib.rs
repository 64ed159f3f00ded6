//! Pillex Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that can be implemented
//! by chip-specific HALs. The control plane, the drivers and the display
//! only ever talk to these traits, so all of them run unchanged on the
//! host under test.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (pillex-firmware)          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pillex-core / pillex-drivers           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pillex-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  pillex-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::InputPin`] - Digital inputs (buttons)
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`i2c::I2cBus`] - I2C bus operations, with [`i2c::BlockingI2c`] over
//!   embedded-hal masters
//! - [`time::Clock`], [`time::DelayMs`] - Monotonic time and short waits

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod time;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::{Direction, InputPin, Level};
pub use i2c::{BlockingI2c, I2cBus};
pub use time::{Clock, DelayMs};
pub use uart::{TxWriter, UartRx, UartTx};
