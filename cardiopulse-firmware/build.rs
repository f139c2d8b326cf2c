//! Build script for cardiopulse-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates pump.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Highest RP2040 GPIO number
const MAX_GPIO: i64 = 29;

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

/// Validate pump.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=pump.toml");

    let config_path = Path::new("pump.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: pump.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds pump.toml as its boot configuration.        ║\n\
            ║  Please create one in the cardiopulse-firmware directory.        ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read pump.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Table = match toml::from_str(&config_content) {
        Ok(table) => table,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in pump.toml                         ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_pump(&config, &mut errors);
    validate_bounds(&config, "systole", &mut errors);
    validate_bounds(&config, "diastole", &mut errors);
    validate_pins(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid pump configuration                               ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=pump.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The firmware parser rejects sections it does not know
fn validate_sections(config: &toml::Table, errors: &mut Vec<String>) {
    const KNOWN: [&str; 5] = ["pump", "systole", "diastole", "stepper", "serial"];

    for (name, value) in config {
        if !value.is_table() {
            errors.push(format!("'{}' must be inside a section", name));
        } else if !KNOWN.contains(&name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
        }
    }
}

fn int(config: &toml::Table, section: &str, key: &str) -> Option<i64> {
    config
        .get(section)
        .and_then(|s| s.get(key))
        .and_then(|v| v.as_integer())
}

fn check_range(
    config: &toml::Table,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) {
    if let Some(v) = int(config, section, key) {
        if v < min || v > max {
            errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
        }
    }
}

fn validate_pump(config: &toml::Table, errors: &mut Vec<String>) {
    check_range(config, "pump", "stroke_steps", 10, 800, errors);
    check_range(config, "pump", "heart_rate_bpm", 30, 120, errors);
    check_range(config, "pump", "reference_bpm", 1, 65_535, errors);
    check_range(config, "pump", "return_delay_us", 1, u32::MAX as i64, errors);
    check_range(config, "pump", "shutdown_delay_us", 1, u32::MAX as i64, errors);
    check_range(config, "pump", "manual_delay_us", 1, u32::MAX as i64, errors);
    check_range(config, "pump", "homing_tolerance_steps", 0, 65_535, errors);
    check_range(config, "stepper", "pulse_width_ns", 1, 100_000, errors);

    if let Some(toml::Value::String(shape)) = config.get("pump").and_then(|p| p.get("stroke_shape"))
    {
        if !["half", "full"].contains(&shape.as_str()) {
            errors.push("[pump] stroke_shape must be 'half' or 'full'".to_string());
        }
    }

    if let Some(micro) = int(config, "stepper", "microsteps") {
        if !(1..=256).contains(&micro) || (micro & (micro - 1)) != 0 {
            errors.push("[stepper] microsteps must be a power of two up to 256".to_string());
        }
    }
}

fn validate_bounds(config: &toml::Table, section: &str, errors: &mut Vec<String>) {
    let fast = int(config, section, "fast_us");
    let slow = int(config, section, "slow_us");

    if let Some(fast) = fast {
        if fast < 1 {
            errors.push(format!("[{}] fast_us must be at least 1", section));
        }
    }
    if let (Some(fast), Some(slow)) = (fast, slow) {
        if fast > slow {
            errors.push(format!("[{}] fast_us must not exceed slow_us", section));
        }
    }
}

/// Pin strings look like "gpio5" or "!gpio8"
fn parse_pin(value: &str) -> Option<i64> {
    let value = value.strip_prefix('!').unwrap_or(value);
    value
        .strip_prefix("gpio")?
        .parse()
        .ok()
}

fn validate_pins(config: &toml::Table, errors: &mut Vec<String>) {
    let keys = [
        ("stepper", "step_pin"),
        ("stepper", "dir_pin"),
        ("stepper", "enable_pin"),
        ("serial", "tx_pin"),
        ("serial", "rx_pin"),
    ];

    let mut used: Vec<i64> = Vec::new();
    for (section, key) in keys {
        let Some(value) = config.get(section).and_then(|s| s.get(key)) else {
            continue;
        };
        let Some(pin) = value.as_str().and_then(parse_pin) else {
            errors.push(format!("[{}] {} must look like \"gpio5\"", section, key));
            continue;
        };
        if !(0..=MAX_GPIO).contains(&pin) {
            errors.push(format!("[{}] {} gpio{} does not exist", section, key, pin));
        } else if used.contains(&pin) {
            errors.push(format!("[{}] {} gpio{} is already in use", section, key, pin));
        }
        used.push(pin);
    }
}
