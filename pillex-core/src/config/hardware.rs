//! Hardware configuration types
//!
//! Bus addresses of the peripherals sharing the I2C bus, the persistent
//! store geometry and the fault code shown on host silence.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Peripheral addresses and sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HardwareConfig {
    /// MCP23017 expander address
    pub expander_addr: u8,
    /// AT24Cxx EEPROM address
    pub eeprom_addr: u8,
    /// EEPROM size in bytes
    pub eeprom_size: u16,
    /// EEPROM page size in bytes
    pub eeprom_page_size: u8,
    /// SH1106 display address
    pub display_addr: u8,
    /// I2C bus frequency in Hz
    pub i2c_frequency: u32,
    /// Error code shown when the host goes silent
    pub liveness_fault_code: i32,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            expander_addr: 0x20,
            eeprom_addr: 0x50,
            eeprom_size: 256,
            eeprom_page_size: 8,
            display_addr: 0x3C,
            i2c_frequency: 100_000,
            liveness_fault_code: 1,
        }
    }
}

impl HardwareConfig {
    /// Check address ranges and sizes
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid = |addr: u8| (0x08..=0x77).contains(&addr);
        if !valid(self.expander_addr) || !valid(self.eeprom_addr) || !valid(self.display_addr) {
            return Err(ConfigError::InvalidAddress);
        }
        if self.eeprom_size == 0 || self.eeprom_page_size == 0 {
            return Err(ConfigError::InvalidStoreSize);
        }
        Ok(())
    }

    /// EEPROMs above 2 KiB take a two-byte word address
    pub fn eeprom_wide_addressing(&self) -> bool {
        self.eeprom_size > 2048
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_addresses() {
        let hw = HardwareConfig::default();
        assert_eq!(hw.expander_addr, 0x20);
        assert_eq!(hw.eeprom_addr, 0x50);
        assert_eq!(hw.display_addr, 0x3C);
        assert_eq!(hw.liveness_fault_code, 1);
        assert!(!hw.eeprom_wide_addressing());
    }

    #[test]
    fn test_reserved_address_rejected() {
        let hw = HardwareConfig {
            display_addr: 0x00,
            ..HardwareConfig::default()
        };
        assert_eq!(hw.validate(), Err(ConfigError::InvalidAddress));
    }

    #[test]
    fn test_zero_store_rejected() {
        let hw = HardwareConfig {
            eeprom_size: 0,
            ..HardwareConfig::default()
        };
        assert_eq!(hw.validate(), Err(ConfigError::InvalidStoreSize));
    }
}
