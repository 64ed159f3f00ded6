//! Build script for pillex-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates device.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Known keys per section with their allowed range
const TIMING_KEYS: &[(&str, i64, i64)] = &[
    ("slider_ms", 1, 10_000),
    ("vibrate_on_ms", 1, 60_000),
    ("nudge_start_ms", 1, 60_000),
    ("nudge_stop_ms", 1, 60_000),
    ("vibrate_cycle_ms", 1, 60_000),
    ("max_retries", 0, 5),
    ("post_retry_offset_ms", 0, 60_000),
    ("debounce_ms", 1, 1_000),
    ("long_press_ms", 1, 10_000),
    ("success_timeout_ms", 1, 600_000),
    ("beacon_interval_ms", 1, 3_600_000),
    ("liveness_timeout_ms", 1, 86_400_000),
    ("refresh_ms", 1, 10_000),
    ("loading_refresh_ms", 1, 10_000),
];

const HARDWARE_KEYS: &[(&str, i64, i64)] = &[
    ("expander_addr", 0x08, 0x77),
    ("eeprom_addr", 0x08, 0x77),
    ("eeprom_size", 1, 65_535),
    ("eeprom_page_size", 1, 64),
    ("display_addr", 0x08, 0x77),
    ("i2c_frequency", 10_000, 1_000_000),
    ("liveness_fault_code", i32::MIN as i64, i32::MAX as i64),
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate device.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read device.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in device.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();

    if let Some(root) = config.as_table() {
        for (name, value) in root {
            match (name.as_str(), value) {
                ("timing", toml::Value::Table(t)) => check_section("timing", t, TIMING_KEYS, &mut errors),
                ("hardware", toml::Value::Table(t)) => {
                    check_section("hardware", t, HARDWARE_KEYS, &mut errors)
                }
                _ => errors.push(format!("Unknown section or key '{}'", name)),
            }
        }
    }

    check_vibrate_schedule(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid configuration in device.toml", &errors);
    }

    println!("cargo:warning=device.toml validated successfully");
}

fn check_section(
    section: &str,
    table: &toml::map::Map<String, toml::Value>,
    known: &[(&str, i64, i64)],
    errors: &mut Vec<String>,
) {
    for (key, value) in table {
        let Some(&(_, min, max)) = known.iter().find(|(k, _, _)| k == key) else {
            errors.push(format!("[{}] unknown key '{}'", section, key));
            continue;
        };
        match value.as_integer() {
            Some(v) if (min..=max).contains(&v) => {}
            Some(_) => errors.push(format!("[{}] {} must be {}..={}", section, key, min, max)),
            None => errors.push(format!("[{}] {} must be an integer", section, key)),
        }
    }
}

/// Vibrate-retry boundaries must be strictly increasing
fn check_vibrate_schedule(config: &toml::Value, errors: &mut Vec<String>) {
    let defaults = [400, 500, 600, 700];
    let keys = [
        "vibrate_on_ms",
        "nudge_start_ms",
        "nudge_stop_ms",
        "vibrate_cycle_ms",
    ];
    let timing = config.get("timing");
    let values: Vec<i64> = keys
        .iter()
        .zip(defaults)
        .map(|(key, default)| {
            timing
                .and_then(|t| t.get(key))
                .and_then(toml::Value::as_integer)
                .unwrap_or(default)
        })
        .collect();

    if values.windows(2).any(|w| w[0] >= w[1]) {
        errors.push(format!(
            "[timing] {} must be strictly increasing",
            keys.join(" < ")
        ));
    }
}

fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|e| {
                let e = if e.len() > 62 {
                    format!("{}...", &e[..59])
                } else {
                    e.clone()
                };
                format!("║  • {:<62} ║", e)
            })
            .collect::<Vec<_>>()
            .join("\n")
    );
}
