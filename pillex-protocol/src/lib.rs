//! Pillex Host Serial Protocol
//!
//! This crate defines the line-oriented protocol between the host
//! scheduling application and the dispenser. It is plain ASCII at
//! 115200 baud so that a person with a terminal can drive the device
//! exactly like the host does.
//!
//! # Protocol Overview
//!
//! ```text
//! host → device   <verb> <arg> <arg> ...\n        (one command per line)
//! device → host   $<event> <payload>\r\n          (asynchronous events)
//!                 $MEM / $I2C / $States ...\r\n   (command replies)
//!                 free text\r\n                   (usage and errors)
//! ```
//!
//! Everything the host treats as machine-readable starts with `$`.
//! Human-readable confirmations and usage text never do.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod events;
pub mod line;
pub mod reply;
pub mod screen;

pub use command::{
    parse, tokenize, Command, ParseError, Tokens, Verb, DEFAULT_READ_LEN, MAX_ARGS,
    MAX_WRITE_BYTES, MESSAGE_CAPACITY,
};
pub use events::{emit, ButtonId, DeviceEvent, PressKind, LINE_END};
pub use line::{Line, LineBuffer, RX_LINE_CAPACITY};
pub use reply::{I2cDevices, MemRow, SensorStates, TimeSet, MEM_ROW_LEN};
pub use screen::ScreenId;

/// Number of dispensing modules addressed by the protocol
pub const MODULE_COUNT: usize = 4;
