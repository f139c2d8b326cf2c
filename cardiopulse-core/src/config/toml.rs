//! Simple TOML parser for the pump configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `pump.toml`. It does NOT support the full TOML format.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - [section] headers
//! - Comments (# ...), including trailing comments
//!
//! Keys that are not recognized are ignored so newer files still load on
//! older firmware. Unknown sections are rejected.

use super::hardware::{MachineConfig, PinConfig};
use super::types::SpeedBounds;
use crate::motion::ProfileShape;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Invalid pin string
    InvalidPin,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Pump,
    Systole,
    Diastole,
    Stepper,
    Serial,
}

/// Parse TOML configuration into MachineConfig
///
/// Values not present in the input keep their defaults.
pub fn parse_config(input: &str) -> Result<MachineConfig, ParseError> {
    let mut config = MachineConfig::new();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line);
            if !header.ends_with(']') {
                return Err(ParseError::InvalidSection);
            }
            section = parse_section_header(&header[1..header.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config)?;
        }
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "pump" => Ok(Section::Pump),
        "systole" => Ok(Section::Systole),
        "diastole" => Ok(Section::Diastole),
        "stepper" => Ok(Section::Stepper),
        "serial" => Ok(Section::Serial),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Remove a trailing comment that is not inside a string
fn strip_comment(value: &str) -> &str {
    match value.find('#') {
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => {
            value[..hash_pos].trim()
        }
        _ => value,
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(line[eq_pos + 1..].trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_string(value: &str) -> &str {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    // TOML allows `_` as a digit separator
    let mut digits = heapless::String::<24>::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a pin string like `"gpio5"` or `"!gpio8"` (inverted)
///
/// All pump pins are outputs, so there is no pull-up prefix.
fn parse_pin(value: &str) -> Result<PinConfig, ParseError> {
    let s = parse_string(value);
    let (inverted, s) = match s.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let number = s.strip_prefix("gpio").ok_or(ParseError::InvalidPin)?;
    let pin = number.parse().map_err(|_| ParseError::InvalidPin)?;
    Ok(PinConfig { pin, inverted })
}

fn parse_shape(value: &str) -> Result<ProfileShape, ParseError> {
    match parse_string(value) {
        "half" => Ok(ProfileShape::Half),
        "full" => Ok(ProfileShape::Full),
        _ => Err(ParseError::InvalidValue),
    }
}

/// `0` or `false` disable the limit
fn parse_runtime(value: &str) -> Result<Option<u32>, ParseError> {
    if let Ok(false) = parse_bool(value) {
        return Ok(None);
    }
    let seconds: u32 = parse_int(value)?;
    Ok((seconds > 0).then_some(seconds))
}

fn apply_bounds(bounds: &mut SpeedBounds, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "fast_us" => bounds.fast_us = parse_int(value)?,
        "slow_us" => bounds.slow_us = parse_int(value)?,
        _ => {}
    }
    Ok(())
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut MachineConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => {}
        Section::Pump => {
            let pump = &mut config.pump;
            match key {
                "stroke_steps" => pump.stroke_steps = parse_int(value)?,
                "stroke_shape" => pump.stroke_shape = parse_shape(value)?,
                "heart_rate_bpm" => pump.heart_rate_bpm = parse_int(value)?,
                "reference_bpm" => pump.reference_bpm = parse_int(value)?,
                "return_delay_us" => pump.return_delay_us = parse_int(value)?,
                "shutdown_delay_us" => pump.shutdown_delay_us = parse_int(value)?,
                "manual_delay_us" => pump.manual_delay_us = parse_int(value)?,
                "homing_tolerance_steps" => pump.homing_tolerance_steps = parse_int(value)?,
                "max_runtime_s" => pump.max_runtime_s = parse_runtime(value)?,
                _ => {}
            }
        }
        Section::Systole => apply_bounds(&mut config.pump.systole, key, value)?,
        Section::Diastole => apply_bounds(&mut config.pump.diastole, key, value)?,
        Section::Stepper => {
            let stepper = &mut config.stepper;
            match key {
                "step_pin" => stepper.step_pin = parse_pin(value)?,
                "dir_pin" => stepper.dir_pin = parse_pin(value)?,
                "enable_pin" => stepper.enable_pin = parse_pin(value)?,
                "full_steps_per_rotation" => stepper.full_steps_per_rotation = parse_int(value)?,
                "microsteps" => stepper.microsteps = parse_int(value)?,
                "pulse_width_ns" => stepper.pulse_width_ns = parse_int(value)?,
                _ => {}
            }
        }
        Section::Serial => {
            let serial = &mut config.serial;
            match key {
                "tx_pin" => serial.tx_pin = parse_pin(value)?.pin,
                "rx_pin" => serial.rx_pin = parse_pin(value)?.pin,
                "baud" => serial.baud = parse_int(value)?,
                _ => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BENCH: &str = r#"
# Bench pump
[pump]
stroke_steps = 250
stroke_shape = "full"
heart_rate_bpm = 75        # resting
homing_tolerance_steps = 3
max_runtime_s = 0

[systole]
fast_us = 2
slow_us = 280

[diastole]
fast_us = 20
slow_us = 420

[stepper]
step_pin = "gpio6"
dir_pin = "!gpio3"
enable_pin = "!gpio9"
microsteps = 8
pulse_width_ns = 3_000

[serial]
tx_pin = "gpio12"
rx_pin = "gpio13"
baud = 9600
"#;

    #[test]
    fn test_parse_pin() {
        let pin = parse_pin("gpio11").unwrap();
        assert_eq!(pin.pin, 11);
        assert!(!pin.inverted);

        let pin = parse_pin("\"!gpio8\"").unwrap();
        assert_eq!(pin.pin, 8);
        assert!(pin.inverted);

        assert_eq!(parse_pin("^gpio4"), Err(ParseError::InvalidPin));
        assert_eq!(parse_pin("!!gpio4"), Err(ParseError::InvalidPin));

        assert_eq!(parse_pin("pin4"), Err(ParseError::InvalidPin));
        assert_eq!(parse_pin("gpio"), Err(ParseError::InvalidPin));
    }

    #[test]
    fn test_parse_full_file() {
        let cfg = parse_config(BENCH).unwrap();
        assert_eq!(cfg.pump.stroke_steps, 250);
        assert_eq!(cfg.pump.stroke_shape, ProfileShape::Full);
        assert_eq!(cfg.pump.heart_rate_bpm, 75);
        assert_eq!(cfg.pump.homing_tolerance_steps, 3);
        assert_eq!(cfg.pump.max_runtime_s, None);
        assert_eq!(cfg.pump.systole, SpeedBounds::new(2, 280));
        assert_eq!(cfg.pump.diastole, SpeedBounds::new(20, 420));
        assert_eq!(cfg.stepper.step_pin, PinConfig::new(6));
        assert!(cfg.stepper.dir_pin.inverted);
        assert_eq!(cfg.stepper.microsteps, 8);
        assert_eq!(cfg.stepper.pulse_width_ns, 3_000);
        assert_eq!(cfg.serial.tx_pin, 12);
        assert_eq!(cfg.serial.baud, 9_600);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn test_missing_values_keep_defaults() {
        let cfg = parse_config("[pump]\nheart_rate_bpm = 90\n").unwrap();
        assert_eq!(cfg.pump.heart_rate_bpm, 90);
        assert_eq!(cfg.pump.stroke_steps, 300);
        assert_eq!(cfg.pump.max_runtime_s, Some(2700));
        assert_eq!(cfg.stepper, MachineConfig::default().stepper);
    }

    #[test]
    fn test_unknown_key_ignored() {
        let cfg = parse_config("[pump]\nflux_capacitor = true\n").unwrap();
        assert_eq!(cfg, MachineConfig::default());
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_config("[valve]\n"), Err(ParseError::InvalidSection));
        assert_eq!(parse_config("[pump\n"), Err(ParseError::InvalidSection));
        assert_eq!(
            parse_config("[pump]\nstroke_steps = many\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[pump]\nstroke_shape = \"square\"\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[stepper]\nstep_pin = \"pin5\"\n"),
            Err(ParseError::InvalidPin)
        );
    }

    #[test]
    fn test_runtime_values() {
        assert_eq!(parse_runtime("false"), Ok(None));
        assert_eq!(parse_runtime("0"), Ok(None));
        assert_eq!(parse_runtime("2_700"), Ok(Some(2700)));
        assert_eq!(parse_bool("true"), Ok(true));
    }

    #[test]
    fn test_section_header_with_comment() {
        let cfg = parse_config("[systole] # contraction\nfast_us = 3\n").unwrap();
        assert_eq!(cfg.pump.systole.fast_us, 3);
    }
}
