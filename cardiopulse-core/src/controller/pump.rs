//! Cardiac cycle controller
//!
//! One [`PumpController::tick`] performs, in order:
//!
//! 1. one runtime governor evaluation,
//! 2. at most one step attempt for the active phase,
//! 3. at most one phase transition.
//!
//! Operator commands are applied between ticks through the entry points
//! (`start_cycle`, `stop`, `emergency_stop`, ...). Nothing here blocks except
//! the driver's pulse-width hold.

use super::status::PumpStatus;
use crate::config::{MachineConfig, PumpConfig};
use crate::motion::{MotionProfile, StepEmitter};
use crate::safety::{within_tolerance, RuntimeGovernor, EMERGENCY_HOME_POSITION};
use crate::state::{CyclePhase, Event, Guards, Transition};
use crate::traits::{Clock, PulseDriver};

/// Pulsatile pump controller
pub struct PumpController<D: PulseDriver> {
    driver: D,
    config: PumpConfig,
    phase: CyclePhase,
    emitter: StepEmitter,
    governor: RuntimeGovernor,
    profile: MotionProfile,
    /// Progress within the active leg
    step_index: u16,
    /// Length of the active leg, latched at leg entry
    leg_steps: u16,
    home: i32,
    /// Steps left in the current homing pass
    return_remaining: u32,
    manual_target: i32,
    /// Manual targets are limited to ± this many steps around home
    manual_range_steps: u32,
    heart_rate_bpm: u16,
    stroke_steps: u16,
    current_delay_us: u32,
    cycles_completed: u32,
}

impl<D: PulseDriver> PumpController<D> {
    /// Create the controller and begin the first systole
    ///
    /// The current position becomes home, the driver is energized and the
    /// runtime session starts at `clock.now_ms()`.
    pub fn new<C: Clock>(driver: D, machine: &MachineConfig, clock: &C) -> Self {
        let config = machine.pump;
        let mut ctl = Self {
            driver,
            config,
            phase: CyclePhase::SystoleAccel,
            emitter: StepEmitter::new(0, machine.stepper.pulse_width_ns),
            governor: RuntimeGovernor::new(config.max_runtime_s),
            profile: MotionProfile::new(),
            step_index: 0,
            leg_steps: 0,
            home: 0,
            return_remaining: 0,
            manual_target: 0,
            manual_range_steps: machine.stepper.steps_per_revolution(),
            heart_rate_bpm: config.heart_rate_bpm,
            stroke_steps: config.stroke_steps,
            current_delay_us: 0,
            cycles_completed: 0,
        };
        ctl.home = ctl.emitter.position().steps();
        ctl.driver.set_enabled(true);
        ctl.governor.start(clock.now_ms());
        ctl.begin_leg();
        ctl
    }

    /// Run one control tick
    ///
    /// Returns the phase change made during this tick, if any.
    pub fn tick<C: Clock>(&mut self, clock: &C) -> Option<Transition> {
        if self.phase.is_stopped() {
            return None;
        }

        self.governor.update(clock.now_ms());
        let now_us = clock.now_us();

        match self.phase {
            CyclePhase::SystoleAccel
            | CyclePhase::SystoleDecel
            | CyclePhase::DiastoleAccel
            | CyclePhase::DiastoleDecel => self.step_leg(now_us),
            CyclePhase::ReturnToStart => self.step_return(now_us),
            CyclePhase::CycleComplete => self.apply(Event::Advance(self.guards())),
            CyclePhase::Shutdown => self.step_shutdown(now_us),
            CyclePhase::ReturnToManualPosition => self.step_manual(now_us),
            CyclePhase::HoldPosition | CyclePhase::Stopped(_) => None,
        }
    }

    fn step_leg(&mut self, now_us: u64) -> Option<Transition> {
        let (direction, segment) = self.phase.leg()?;

        if self.step_index < self.leg_steps {
            let delay = self.profile.leg_delay(self.step_index, self.leg_steps, segment);
            self.current_delay_us = delay;
            if !self.emitter.try_step(&mut self.driver, now_us, direction, delay) {
                return None;
            }
            self.step_index += 1;
        }

        if self.step_index < self.leg_steps {
            return None;
        }

        if self.phase == CyclePhase::DiastoleDecel {
            self.cycles_completed = self.cycles_completed.wrapping_add(1);
        }
        self.apply(Event::LegExhausted(self.guards()))
    }

    fn step_return(&mut self, now_us: u64) -> Option<Transition> {
        if self.return_remaining > 0 {
            let Some(direction) = self.emitter.position().direction_to(self.home) else {
                self.return_remaining = 0;
                return self.finish_return();
            };
            let delay = self.delay_at_rate(self.config.return_delay_us);
            self.current_delay_us = delay;
            if !self.emitter.try_step(&mut self.driver, now_us, direction, delay) {
                return None;
            }
            self.return_remaining -= 1;
        }

        if self.return_remaining == 0 {
            return self.finish_return();
        }
        None
    }

    /// End of a homing pass: snap if close enough, otherwise go again
    fn finish_return(&mut self) -> Option<Transition> {
        let error = self.position_error();
        if within_tolerance(error, self.config.homing_tolerance_steps) {
            self.emitter.snap_to(self.home);
            return self.apply(Event::HomeReached(self.guards()));
        }
        self.return_remaining = self.emitter.position().distance_to(self.home);
        None
    }

    fn step_shutdown(&mut self, now_us: u64) -> Option<Transition> {
        if within_tolerance(self.position_error(), self.config.homing_tolerance_steps) {
            self.emitter.snap_to(self.home);
            return self.apply(Event::HomeReached(self.guards()));
        }

        let direction = self.emitter.position().direction_to(self.home)?;
        let delay = self.delay_at_rate(self.config.shutdown_delay_us);
        self.current_delay_us = delay;
        self.emitter.try_step(&mut self.driver, now_us, direction, delay);
        None
    }

    fn step_manual(&mut self, now_us: u64) -> Option<Transition> {
        let Some(direction) = self.emitter.position().direction_to(self.manual_target) else {
            return self.apply(Event::TargetReached);
        };
        let delay = self.config.manual_delay_us;
        self.current_delay_us = delay;
        self.emitter.try_step(&mut self.driver, now_us, direction, delay);
        None
    }

    /// Run the transition function and the entry actions of the new phase
    fn apply(&mut self, event: Event) -> Option<Transition> {
        let from = self.phase;
        let to = from.transition(event);
        if to == from {
            return None;
        }

        self.phase = to;
        self.enter(to);
        Some(Transition { from, to, event })
    }

    fn enter(&mut self, phase: CyclePhase) {
        let energized = phase.motor_enabled();
        if energized != self.driver.is_enabled() {
            if !energized {
                self.driver.deassert_step();
            }
            self.driver.set_enabled(energized);
        }

        match phase {
            CyclePhase::SystoleAccel
            | CyclePhase::SystoleDecel
            | CyclePhase::DiastoleAccel
            | CyclePhase::DiastoleDecel => self.begin_leg(),
            CyclePhase::ReturnToStart => {
                self.step_index = 0;
                self.return_remaining = self.emitter.position().distance_to(self.home);
                self.current_delay_us = self.delay_at_rate(self.config.return_delay_us);
            }
            CyclePhase::Shutdown => {
                self.step_index = 0;
                self.governor.consume_cycle_boundary();
                self.current_delay_us = self.delay_at_rate(self.config.shutdown_delay_us);
            }
            CyclePhase::ReturnToManualPosition => {
                self.step_index = 0;
                self.current_delay_us = self.config.manual_delay_us;
            }
            CyclePhase::CycleComplete | CyclePhase::HoldPosition => {
                self.step_index = 0;
            }
            CyclePhase::Stopped(_) => {}
        }
    }

    /// Latch the stroke and regenerate the profile for the active leg
    fn begin_leg(&mut self) {
        self.step_index = 0;
        self.leg_steps = self.stroke_steps;

        let base = if self.phase.is_systole() {
            self.config.systole
        } else {
            self.config.diastole
        };
        let bounds = self.config.bounds_at_rate(base, self.heart_rate_bpm);
        let len = self.leg_steps as usize * 2;
        self.profile.regenerate(bounds, self.config.stroke_shape, len);

        if let Some((_, segment)) = self.phase.leg() {
            self.current_delay_us = self.profile.leg_delay(0, self.leg_steps, segment);
        }
    }

    fn guards(&self) -> Guards {
        Guards {
            shutdown_pending: self.governor.shutdown_requested()
                && self.governor.complete_current_cycle(),
            at_home: self.position_error() == 0,
        }
    }

    fn position_error(&self) -> i32 {
        self.emitter.position().error_from(self.home)
    }

    fn delay_at_rate(&self, delay_us: u32) -> u32 {
        self.config.delay_at_rate(delay_us, self.heart_rate_bpm)
    }

    // ---- Command entry points ----

    /// Start a new session from `Stopped` or `HoldPosition`
    ///
    /// Re-energizes the motor, restarts the runtime governor and begins
    /// systole. Returns `None` if a cycle is already in progress.
    pub fn start_cycle<C: Clock>(&mut self, clock: &C) -> Option<Transition> {
        if self.phase.transition(Event::Start) == self.phase {
            return None;
        }
        self.emitter.forget_timing();
        self.governor.start(clock.now_ms());
        self.apply(Event::Start)
    }

    /// Stop stepping and de-energize, keeping position and home
    pub fn stop(&mut self) -> Option<Transition> {
        self.apply(Event::Stop)
    }

    /// Unconditional emergency stop
    ///
    /// Releases the step output, de-energizes the motor and zeroes both
    /// position and home. Leg progress and the profile are left as they
    /// were; the next start rebuilds them.
    pub fn emergency_stop(&mut self) -> Option<Transition> {
        self.driver.deassert_step();
        self.driver.set_enabled(false);
        self.emitter.snap_to(EMERGENCY_HOME_POSITION);
        self.emitter.forget_timing();
        self.home = EMERGENCY_HOME_POSITION;
        self.return_remaining = 0;
        self.apply(Event::EmergencyStop)
    }

    /// Set the heart rate used from the next leg on
    pub fn set_heart_rate(&mut self, bpm: u16) {
        debug_assert!(bpm > 0);
        self.heart_rate_bpm = bpm.max(1);
    }

    /// Set the stroke length used from the next leg on
    pub fn set_stroke_steps(&mut self, steps: u16) {
        debug_assert!(steps > 0 && steps as usize * 2 <= crate::motion::MAX_PROFILE_LEN);
        self.stroke_steps = steps;
    }

    /// Move to `target` and hold there
    ///
    /// Accepted from `HoldPosition`, a commanded stop, or an in-progress
    /// manual move (which is retargeted). Returns `None` when no phase change
    /// happened; check [`PumpController::phase`] to tell a retarget from a
    /// refusal.
    pub fn move_to(&mut self, target: i32) -> Option<Transition> {
        if self.phase.transition(Event::MoveToManual) != CyclePhase::ReturnToManualPosition {
            return None;
        }
        self.manual_target = target;
        if self.phase.is_stopped() {
            self.emitter.forget_timing();
        }
        self.apply(Event::MoveToManual)
    }

    /// Latch a graceful shutdown at the end of the current cycle
    ///
    /// Returns `true` if this call set the latch.
    pub fn request_shutdown(&mut self) -> bool {
        if self.phase.is_stopped() {
            return false;
        }
        self.governor.request_shutdown()
    }

    // ---- Accessors ----

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn position(&self) -> i32 {
        self.emitter.position().steps()
    }

    pub fn home(&self) -> i32 {
        self.home
    }

    pub fn current_delay_us(&self) -> u32 {
        self.current_delay_us
    }

    pub fn step_index(&self) -> u16 {
        self.step_index
    }

    pub fn leg_steps(&self) -> u16 {
        self.leg_steps
    }

    pub fn governor(&self) -> &RuntimeGovernor {
        &self.governor
    }

    pub fn heart_rate_bpm(&self) -> u16 {
        self.heart_rate_bpm
    }

    pub fn stroke_steps(&self) -> u16 {
        self.stroke_steps
    }

    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    pub fn manual_target(&self) -> i32 {
        self.manual_target
    }

    pub fn manual_range_steps(&self) -> u32 {
        self.manual_range_steps
    }

    pub fn profile(&self) -> &MotionProfile {
        &self.profile
    }

    pub fn config(&self) -> &PumpConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Snapshot for status reporting
    pub fn status<C: Clock>(&self, clock: &C) -> PumpStatus {
        PumpStatus {
            phase: self.phase,
            position: self.position(),
            home: self.home,
            current_delay_us: self.current_delay_us,
            step_index: self.step_index,
            leg_steps: self.leg_steps,
            heart_rate_bpm: self.heart_rate_bpm,
            stroke_steps: self.stroke_steps,
            shutdown_requested: self.governor.shutdown_requested(),
            complete_current_cycle: self.governor.complete_current_cycle(),
            cycles_completed: self.cycles_completed,
            enabled: self.driver.is_enabled(),
            elapsed_ms: self.governor.elapsed_ms(clock.now_ms()),
        }
    }
}
