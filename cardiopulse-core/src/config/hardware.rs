//! Hardware configuration types
//!
//! These types define the pin assignments and driver limits for the
//! stepper output stage and the operator serial port.

use super::types::{limits, PumpConfig};

/// Highest GPIO number on the RP2040
pub const MAX_GPIO: u8 = 29;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    /// GPIO pin number (0-29 for RP2040)
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
        }
    }
}

/// Step/dir driver hardware configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepperHwConfig {
    /// Step pulse pin
    pub step_pin: PinConfig,
    /// Direction pin
    pub dir_pin: PinConfig,
    /// Enable pin (active-low on DM860I)
    pub enable_pin: PinConfig,
    /// Full steps per motor rotation (200 for 1.8° motors)
    pub full_steps_per_rotation: u16,
    /// Microstep divisor set on the driver DIP switches
    pub microsteps: u16,
    /// Minimum step pulse width in nanoseconds
    pub pulse_width_ns: u32,
}

impl Default for StepperHwConfig {
    fn default() -> Self {
        Self {
            step_pin: PinConfig::new(5),
            dir_pin: PinConfig::new(2),
            enable_pin: PinConfig::inverted(8),
            full_steps_per_rotation: 200,
            microsteps: 16,
            // DM860I datasheet minimum is 2.5 µs
            pulse_width_ns: 2_500,
        }
    }
}

impl StepperHwConfig {
    /// Microsteps per output shaft revolution
    pub fn steps_per_revolution(&self) -> u32 {
        self.full_steps_per_rotation as u32 * self.microsteps as u32
    }
}

/// Operator serial port configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialConfig {
    /// UART TX pin
    pub tx_pin: u8,
    /// UART RX pin
    pub rx_pin: u8,
    /// Baud rate
    pub baud: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            tx_pin: 0,
            rx_pin: 1,
            baud: 115_200,
        }
    }
}

/// Configuration validation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Systole fast delay is zero or slower than its slow delay
    InvalidSystoleBounds,
    /// Diastole fast delay is zero or slower than its slow delay
    InvalidDiastoleBounds,
    /// Stroke length outside the supported range
    InvalidStroke,
    /// Heart rate outside the safe range, or zero reference rate
    InvalidHeartRate,
    /// A fixed step delay is zero
    InvalidDelay,
    /// Pulse width is zero or longer than 100 µs
    InvalidPulseWidth,
    /// Microsteps not a power of two in 1..=256
    InvalidMicrosteps,
    /// Full steps per rotation is zero
    InvalidStepsPerRotation,
    /// GPIO number out of range
    InvalidPin(u8),
    /// Same GPIO assigned twice
    PinConflict(u8),
    /// Baud rate is zero
    InvalidBaudRate,
}

/// Complete machine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MachineConfig {
    /// Cycle timing
    pub pump: PumpConfig,
    /// Stepper driver
    pub stepper: StepperHwConfig,
    /// Operator serial port
    pub serial: SerialConfig,
}

impl MachineConfig {
    /// Create a configuration with the bench defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the configuration for values the controller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pump = &self.pump;

        if !pump.systole.is_valid() {
            return Err(ConfigError::InvalidSystoleBounds);
        }
        if !pump.diastole.is_valid() {
            return Err(ConfigError::InvalidDiastoleBounds);
        }
        if !(limits::MIN_STROKE_STEPS..=limits::MAX_STROKE_STEPS).contains(&pump.stroke_steps) {
            return Err(ConfigError::InvalidStroke);
        }
        if !(limits::MIN_HEART_RATE_BPM..=limits::MAX_HEART_RATE_BPM)
            .contains(&pump.heart_rate_bpm)
            || pump.reference_bpm == 0
        {
            return Err(ConfigError::InvalidHeartRate);
        }
        if pump.return_delay_us == 0 || pump.shutdown_delay_us == 0 || pump.manual_delay_us == 0 {
            return Err(ConfigError::InvalidDelay);
        }

        let stepper = &self.stepper;
        if stepper.pulse_width_ns == 0 || stepper.pulse_width_ns > 100_000 {
            return Err(ConfigError::InvalidPulseWidth);
        }
        if !stepper.microsteps.is_power_of_two() || stepper.microsteps > 256 {
            return Err(ConfigError::InvalidMicrosteps);
        }
        if stepper.full_steps_per_rotation == 0 {
            return Err(ConfigError::InvalidStepsPerRotation);
        }

        if self.serial.baud == 0 {
            return Err(ConfigError::InvalidBaudRate);
        }

        let pins = [
            stepper.step_pin.pin,
            stepper.dir_pin.pin,
            stepper.enable_pin.pin,
            self.serial.tx_pin,
            self.serial.rx_pin,
        ];
        for (i, &pin) in pins.iter().enumerate() {
            if pin > MAX_GPIO {
                return Err(ConfigError::InvalidPin(pin));
            }
            if pins[..i].contains(&pin) {
                return Err(ConfigError::PinConflict(pin));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpeedBounds;

    #[test]
    fn test_default_is_valid() {
        let cfg = MachineConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.stepper.steps_per_revolution(), 3_200);
        assert!(cfg.stepper.enable_pin.inverted);
        assert!(!cfg.stepper.step_pin.inverted);
    }

    #[test]
    fn test_invalid_bounds() {
        let mut cfg = MachineConfig::default();
        cfg.pump.systole = SpeedBounds::new(400, 300);
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidSystoleBounds));

        let mut cfg = MachineConfig::default();
        cfg.pump.diastole = SpeedBounds::new(0, 300);
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidDiastoleBounds));
    }

    #[test]
    fn test_invalid_stroke_and_rate() {
        let mut cfg = MachineConfig::default();
        cfg.pump.stroke_steps = 801;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidStroke));

        let mut cfg = MachineConfig::default();
        cfg.pump.heart_rate_bpm = 200;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidHeartRate));

        let mut cfg = MachineConfig::default();
        cfg.pump.reference_bpm = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidHeartRate));
    }

    #[test]
    fn test_pin_checks() {
        let mut cfg = MachineConfig::default();
        cfg.stepper.dir_pin = PinConfig::new(5);
        assert_eq!(cfg.validate(), Err(ConfigError::PinConflict(5)));

        let mut cfg = MachineConfig::default();
        cfg.serial.rx_pin = 30;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidPin(30)));
    }

    #[test]
    fn test_microsteps() {
        let mut cfg = MachineConfig::default();
        cfg.stepper.microsteps = 12;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidMicrosteps));
    }
}
