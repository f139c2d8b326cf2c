//! Non-blocking step emission
//!
//! The emitter never waits for an inter-step delay. Each call checks the
//! elapsed time since the previous pulse and either emits exactly one pulse
//! or returns immediately.

use super::position::PositionCounter;
use crate::traits::{Direction, PulseDriver};

/// Emits single step pulses and keeps the position counter
#[derive(Debug, Clone)]
pub struct StepEmitter {
    position: PositionCounter,
    last_step_us: Option<u64>,
    direction: Option<Direction>,
    pulse_width_ns: u32,
}

impl StepEmitter {
    /// Create an emitter at `position` with the driver's minimum pulse width
    pub const fn new(position: i32, pulse_width_ns: u32) -> Self {
        Self {
            position: PositionCounter::new(position),
            last_step_us: None,
            direction: None,
            pulse_width_ns,
        }
    }

    /// Emit one pulse if at least `required_delay_us` has elapsed
    ///
    /// The first pulse after construction or [`StepEmitter::forget_timing`]
    /// is always allowed. Returns `true` if a pulse was emitted.
    pub fn try_step<D: PulseDriver>(
        &mut self,
        driver: &mut D,
        now_us: u64,
        direction: Direction,
        required_delay_us: u32,
    ) -> bool {
        if let Some(last) = self.last_step_us {
            if now_us.saturating_sub(last) < required_delay_us as u64 {
                return false;
            }
        }

        if self.direction != Some(direction) {
            driver.set_direction(direction);
            self.direction = Some(direction);
        }

        driver.assert_step();
        driver.hold_pulse(self.pulse_width_ns);
        driver.deassert_step();

        self.position.advance(direction);
        self.last_step_us = Some(now_us);
        true
    }

    pub fn position(&self) -> PositionCounter {
        self.position
    }

    /// Overwrite the position (homing snap)
    pub(crate) fn snap_to(&mut self, steps: i32) {
        self.position.set(steps);
    }

    /// Forget pulse history so the next pulse is emitted immediately and the
    /// direction output is rewritten
    pub(crate) fn forget_timing(&mut self) {
        self.last_step_us = None;
        self.direction = None;
    }
}
