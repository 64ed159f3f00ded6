//! Board-agnostic control plane for the pill dispenser firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (expander port, persistent store, bus scanner)
//! - Actuator driver and pill drop state machine
//! - Dispense queue
//! - Button debouncing and press classification
//! - Screen selection and refresh pacing
//! - Host liveness monitoring
//! - The [`device::Device`] context that runs one poll tick
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clock;
pub mod config;
pub mod device;
pub mod dispense;
pub mod input;
pub mod safety;
pub mod screen;
pub mod traits;

#[cfg(test)]
mod testing;

pub use device::{BootError, Device};
