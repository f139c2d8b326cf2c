//! Step/direction pulse driver trait
//!
//! This trait abstracts over external step/dir stepper drivers
//! (DM860I, TB6600, A4988, etc.) that advance one microstep per pulse.

/// Motor rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Clockwise rotation (systole, position decreases)
    Clockwise,
    /// Counter-clockwise rotation (diastole, position increases)
    CounterClockwise,
}

impl Direction {
    /// Position change produced by one pulse in this direction
    pub const fn step_delta(self) -> i32 {
        match self {
            Direction::Clockwise => -1,
            Direction::CounterClockwise => 1,
        }
    }

    /// Direction that moves `position` toward `target`
    ///
    /// Returns `None` when already on target.
    pub fn toward(position: i32, target: i32) -> Option<Self> {
        match target.cmp(&position) {
            core::cmp::Ordering::Greater => Some(Direction::CounterClockwise),
            core::cmp::Ordering::Less => Some(Direction::Clockwise),
            core::cmp::Ordering::Equal => None,
        }
    }
}

/// Trait for step/direction pulse drivers
///
/// Implementations own the step, direction and enable outputs. The
/// controller decides *when* to pulse; the driver only performs the pin
/// sequence.
pub trait PulseDriver {
    /// Drive the step output to its active level
    fn assert_step(&mut self);

    /// Return the step output to its idle level
    fn deassert_step(&mut self);

    /// Busy-wait for the minimum pulse width
    ///
    /// This is the only blocking operation in the control loop and is
    /// bounded by the driver's datasheet pulse width (a few microseconds).
    fn hold_pulse(&mut self, width_ns: u32);

    /// Set the rotation direction for subsequent pulses
    fn set_direction(&mut self, dir: Direction);

    /// Energize or de-energize the motor
    ///
    /// When disabled, the motor is free to rotate and does not hold position.
    fn set_enabled(&mut self, enabled: bool);

    /// Check if the motor is energized
    fn is_enabled(&self) -> bool;
}
