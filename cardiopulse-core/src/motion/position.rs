//! Open-loop step position tracking

use crate::traits::Direction;

/// Signed step count relative to the power-on reference
///
/// Counter-clockwise pulses increment, clockwise pulses decrement. There is
/// no encoder; the count is only as good as the pulses actually taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PositionCounter(i32);

impl PositionCounter {
    pub const fn new(steps: i32) -> Self {
        Self(steps)
    }

    /// Current position in steps
    pub const fn steps(&self) -> i32 {
        self.0
    }

    /// Record one pulse in `dir`
    pub(crate) fn advance(&mut self, dir: Direction) {
        self.0 = self.0.wrapping_add(dir.step_delta());
    }

    /// Overwrite the count (homing snap or emergency zero)
    pub(crate) fn set(&mut self, steps: i32) {
        self.0 = steps;
    }

    /// Signed distance from `target` to here
    pub fn error_from(&self, target: i32) -> i32 {
        self.0.saturating_sub(target)
    }

    /// Absolute number of steps to reach `target`
    pub fn distance_to(&self, target: i32) -> u32 {
        self.error_from(target).unsigned_abs()
    }

    /// Direction of travel toward `target`, or `None` if already there
    pub fn direction_to(&self, target: i32) -> Option<Direction> {
        Direction::toward(self.0, target)
    }
}
