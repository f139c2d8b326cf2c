//! Safety policies
//!
//! Runtime limiting, homing tolerance and emergency-stop behavior.
//!
//! # Emergency stop
//!
//! An emergency stop releases the step output, de-energizes the motor and
//! declares the current physical position to be [`EMERGENCY_HOME_POSITION`].
//! The step count from before the stop is discarded, so a subsequent start
//! treats wherever the mechanism came to rest as home.

pub mod governor;

pub use governor::RuntimeGovernor;

/// Default maximum residual error considered "at home"
pub const DEFAULT_HOMING_TOLERANCE_STEPS: u16 = 5;

/// Position and home after an emergency stop
pub const EMERGENCY_HOME_POSITION: i32 = 0;

/// Check whether `error` steps is close enough to count as on target
pub fn within_tolerance(error: i32, tolerance: u16) -> bool {
    error.unsigned_abs() <= tolerance as u32
}
