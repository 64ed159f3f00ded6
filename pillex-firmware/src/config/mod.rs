//! Configuration loading
//!
//! The device configuration is compiled into the firmware from
//! `device.toml` and parsed at boot by a small no_std parser.

pub mod toml;

use defmt::*;
use pillex_core::config::DeviceConfig;

pub use toml::{parse_config, ParseError};

/// Parse the embedded configuration, falling back to defaults
pub fn load(source: &str) -> DeviceConfig {
    match parse_config(source) {
        Ok(config) => {
            info!("Loaded configuration from device.toml");
            config
        }
        Err(e) => {
            warn!("Invalid device.toml ({}), using defaults", e);
            DeviceConfig::default()
        }
    }
}
