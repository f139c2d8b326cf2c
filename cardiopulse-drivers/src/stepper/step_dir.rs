//! Step/direction stepper driver
//!
//! Drives an external microstepping driver through three logic inputs:
//! PUL (step), DIR and ENA. One rising edge on PUL advances one microstep.
//!
//! # Timing (DM860I)
//!
//! ```text
//!  ENA  ──┐ (active-low)
//!         └─────────────────────────────────────
//!  DIR  ─────────┐ ≥5 µs setup
//!                └──────────────────────────────
//!  PUL  ──────────────────┐  ≥2.5 µs  ┌─────────
//!                         └───────────┘
//! ```

use cardiopulse_core::config::StepperHwConfig;
use cardiopulse_core::traits::{Direction, PulseDriver};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Pin polarity and timing for a step/dir driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepDirConfig {
    /// PUL is active-low
    pub step_inverted: bool,
    /// DIR is inverted (swaps rotation sense)
    pub dir_inverted: bool,
    /// ENA is active-low
    pub enable_inverted: bool,
    /// Wait after changing DIR before the next PUL edge
    pub dir_setup_ns: u32,
}

impl Default for StepDirConfig {
    fn default() -> Self {
        Self {
            step_inverted: false,
            dir_inverted: false,
            enable_inverted: true,
            dir_setup_ns: 5_000,
        }
    }
}

impl From<&StepperHwConfig> for StepDirConfig {
    fn from(hw: &StepperHwConfig) -> Self {
        Self {
            step_inverted: hw.step_pin.inverted,
            dir_inverted: hw.dir_pin.inverted,
            enable_inverted: hw.enable_pin.inverted,
            ..Self::default()
        }
    }
}

/// Step/dir driver over `embedded-hal` pins
///
/// Pin errors are ignored; the RP2040 GPIO outputs are infallible.
pub struct StepDirDriver<STEP, DIR, EN, DELAY> {
    step: STEP,
    dir: DIR,
    enable: EN,
    delay: DELAY,
    config: StepDirConfig,
    enabled: bool,
}

impl<STEP, DIR, EN, DELAY> StepDirDriver<STEP, DIR, EN, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    DELAY: DelayNs,
{
    /// Create a driver with the step output idle and the motor de-energized
    pub fn new(step: STEP, dir: DIR, enable: EN, delay: DELAY, config: StepDirConfig) -> Self {
        let mut driver = Self {
            step,
            dir,
            enable,
            delay,
            config,
            enabled: false,
        };
        driver.deassert_step();
        driver.set_enabled(false);
        driver
    }

    /// Release the pins and delay provider
    pub fn release(self) -> (STEP, DIR, EN, DELAY) {
        (self.step, self.dir, self.enable, self.delay)
    }
}

/// Drive `pin` to the level that means `active` under `inverted` polarity
fn write<P: OutputPin>(pin: &mut P, active: bool, inverted: bool) {
    if active != inverted {
        let _ = pin.set_high();
    } else {
        let _ = pin.set_low();
    }
}

impl<STEP, DIR, EN, DELAY> PulseDriver for StepDirDriver<STEP, DIR, EN, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    DELAY: DelayNs,
{
    fn assert_step(&mut self) {
        write(&mut self.step, true, self.config.step_inverted);
    }

    fn deassert_step(&mut self) {
        write(&mut self.step, false, self.config.step_inverted);
    }

    fn hold_pulse(&mut self, width_ns: u32) {
        self.delay.delay_ns(width_ns);
    }

    fn set_direction(&mut self, dir: Direction) {
        // Clockwise drives DIR high before inversion
        let clockwise = dir == Direction::Clockwise;
        write(&mut self.dir, clockwise, self.config.dir_inverted);
        self.delay.delay_ns(self.config.dir_setup_ns);
    }

    fn set_enabled(&mut self, enabled: bool) {
        write(&mut self.enable, enabled, self.config.enable_inverted);
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardiopulse_core::config::{PinConfig, StepperHwConfig};
    use core::convert::Infallible;

    /// Mock GPIO pin for testing
    #[derive(Default)]
    struct MockPin {
        high: bool,
        rising_edges: u32,
    }

    impl embedded_hal::digital::ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) -> Result<(), Self::Error> {
            if !self.high {
                self.rising_edges += 1;
            }
            self.high = true;
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            Ok(())
        }
    }

    /// Delay that only records the requested time
    #[derive(Default)]
    struct MockDelay {
        total_ns: u64,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += ns as u64;
        }
    }

    type TestDriver = StepDirDriver<MockPin, MockPin, MockPin, MockDelay>;

    fn driver(config: StepDirConfig) -> TestDriver {
        StepDirDriver::new(
            MockPin::default(),
            MockPin::default(),
            MockPin::default(),
            MockDelay::default(),
            config,
        )
    }

    #[test]
    fn test_starts_disabled_and_idle() {
        let d = driver(StepDirConfig::default());
        assert!(!d.is_enabled());
        // Active-low enable: disabled = high
        assert!(d.enable.high);
        assert!(!d.step.high);
    }

    #[test]
    fn test_enable_active_low() {
        let mut d = driver(StepDirConfig::default());
        d.set_enabled(true);
        assert!(d.is_enabled());
        assert!(!d.enable.high);
        d.set_enabled(false);
        assert!(d.enable.high);
    }

    #[test]
    fn test_pulse_sequence() {
        let mut d = driver(StepDirConfig::default());
        d.assert_step();
        assert!(d.step.high);
        d.hold_pulse(2_500);
        d.deassert_step();
        assert!(!d.step.high);
        assert_eq!(d.step.rising_edges, 1);
        assert_eq!(d.delay.total_ns, 2_500);
    }

    #[test]
    fn test_inverted_step() {
        let mut d = driver(StepDirConfig {
            step_inverted: true,
            ..StepDirConfig::default()
        });
        // Idle level is high for an active-low input
        assert!(d.step.high);
        d.assert_step();
        assert!(!d.step.high);
    }

    #[test]
    fn test_direction_levels_and_setup_time() {
        let mut d = driver(StepDirConfig::default());
        d.set_direction(Direction::Clockwise);
        assert!(d.dir.high);
        d.set_direction(Direction::CounterClockwise);
        assert!(!d.dir.high);
        assert_eq!(d.delay.total_ns, 10_000);

        let mut d = driver(StepDirConfig {
            dir_inverted: true,
            ..StepDirConfig::default()
        });
        d.set_direction(Direction::Clockwise);
        assert!(!d.dir.high);
    }

    #[test]
    fn test_config_from_hardware() {
        let mut hw = StepperHwConfig::default();
        hw.dir_pin = PinConfig::inverted(2);
        let cfg = StepDirConfig::from(&hw);
        assert!(!cfg.step_inverted);
        assert!(cfg.dir_inverted);
        assert!(cfg.enable_inverted);
        assert_eq!(cfg.dir_setup_ns, 5_000);
    }

    #[test]
    fn test_release() {
        let mut d = driver(StepDirConfig::default());
        d.set_enabled(true);
        let (_, _, enable, _) = d.release();
        assert!(!enable.high);
    }
}
