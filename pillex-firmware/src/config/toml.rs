//! Simple TOML parser for the device configuration
//!
//! This is a minimal TOML parser that handles only the subset used by
//! `device.toml`. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - `[timing]` and `[hardware]` section headers
//! - `key = integer` pairs, decimal or `0x` hex, `_` separators allowed
//! - Comments (# ...)
//!
//! Every key is optional and overlays [`DeviceConfig::default`]. The
//! result is validated before it is returned.

use pillex_core::config::{ConfigError, DeviceConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key outside a section or not known in its section
    UnknownKey,
    /// Value is not an integer in range for its field
    InvalidValue,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Parsed values failed validation
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Timing,
    Hardware,
}

/// Parse TOML configuration into DeviceConfig
pub fn parse_config(input: &str) -> Result<DeviceConfig, ParseError> {
    let mut config = DeviceConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = match header.trim() {
                "timing" => Section::Timing,
                "hardware" => Section::Hardware,
                _ => return Err(ParseError::InvalidSection),
            };
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        match section {
            Section::Root => return Err(ParseError::UnknownKey),
            Section::Timing => apply_timing(&mut config, key, value)?,
            Section::Hardware => apply_hardware(&mut config, key, value)?,
        }
    }

    config.validate()?;
    Ok(config)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Integer with optional sign, `0x` prefix and `_` separators
fn parse_int(value: &str) -> Result<i64, ParseError> {
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    let (radix, digits) = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, digits),
    };
    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') {
        return Err(ParseError::InvalidValue);
    }

    let mut acc: i64 = 0;
    for c in digits.chars().filter(|&c| c != '_') {
        let d = c.to_digit(radix).ok_or(ParseError::InvalidValue)?;
        acc = acc
            .checked_mul(i64::from(radix))
            .and_then(|a| a.checked_add(i64::from(d)))
            .ok_or(ParseError::InvalidValue)?;
    }
    Ok(if negative { -acc } else { acc })
}

fn parse_num<T: TryFrom<i64>>(value: &str) -> Result<T, ParseError> {
    T::try_from(parse_int(value)?).map_err(|_| ParseError::InvalidValue)
}

fn apply_timing(config: &mut DeviceConfig, key: &str, value: &str) -> Result<(), ParseError> {
    let t = &mut config.timing;
    match key {
        "slider_ms" => t.slider_ms = parse_num(value)?,
        "vibrate_on_ms" => t.vibrate_on_ms = parse_num(value)?,
        "nudge_start_ms" => t.nudge_start_ms = parse_num(value)?,
        "nudge_stop_ms" => t.nudge_stop_ms = parse_num(value)?,
        "vibrate_cycle_ms" => t.vibrate_cycle_ms = parse_num(value)?,
        "max_retries" => t.max_retries = parse_num(value)?,
        "post_retry_offset_ms" => t.post_retry_offset_ms = parse_num(value)?,
        "debounce_ms" => t.debounce_ms = parse_num(value)?,
        "long_press_ms" => t.long_press_ms = parse_num(value)?,
        "success_timeout_ms" => t.success_timeout_ms = parse_num(value)?,
        "beacon_interval_ms" => t.beacon_interval_ms = parse_num(value)?,
        "liveness_timeout_ms" => t.liveness_timeout_ms = parse_num(value)?,
        "refresh_ms" => t.refresh_ms = parse_num(value)?,
        "loading_refresh_ms" => t.loading_refresh_ms = parse_num(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_hardware(config: &mut DeviceConfig, key: &str, value: &str) -> Result<(), ParseError> {
    let h = &mut config.hardware;
    match key {
        "expander_addr" => h.expander_addr = parse_num(value)?,
        "eeprom_addr" => h.eeprom_addr = parse_num(value)?,
        "eeprom_size" => h.eeprom_size = parse_num(value)?,
        "eeprom_page_size" => h.eeprom_page_size = parse_num(value)?,
        "display_addr" => h.display_addr = parse_num(value)?,
        "i2c_frequency" => h.i2c_frequency = parse_num(value)?,
        "liveness_fault_code" => h.liveness_fault_code = parse_num(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}
