//! Host-side test doubles for the driver and clock traits

use crate::traits::{Clock, Direction, PulseDriver};

/// Pulse driver that records every pin operation
#[derive(Debug, Default)]
pub struct MockDriver {
    pub enabled: bool,
    pub step_high: bool,
    pub direction: Option<Direction>,
    pub direction_writes: u32,
    pub pulses: u32,
    pub cw_pulses: u32,
    pub ccw_pulses: u32,
    pub pulses_while_disabled: u32,
    pub last_pulse_width_ns: u32,
    pub deasserts: u32,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Net position change implied by the recorded pulses
    pub fn net_steps(&self) -> i32 {
        self.ccw_pulses as i32 - self.cw_pulses as i32
    }
}

impl PulseDriver for MockDriver {
    fn assert_step(&mut self) {
        assert!(!self.step_high, "step asserted twice without release");
        self.step_high = true;
        self.pulses += 1;
        if !self.enabled {
            self.pulses_while_disabled += 1;
        }
        match self.direction {
            Some(Direction::Clockwise) => self.cw_pulses += 1,
            Some(Direction::CounterClockwise) => self.ccw_pulses += 1,
            None => panic!("pulse before direction was set"),
        }
    }

    fn deassert_step(&mut self) {
        self.step_high = false;
        self.deasserts += 1;
    }

    fn hold_pulse(&mut self, width_ns: u32) {
        self.last_pulse_width_ns = width_ns;
    }

    fn set_direction(&mut self, dir: Direction) {
        self.direction = Some(dir);
        self.direction_writes += 1;
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Clock advanced explicitly by the test
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualClock {
    pub us: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_us(&mut self, us: u64) {
        self.us += us;
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.us += ms * 1_000;
    }
}

impl Clock for ManualClock {
    fn now_us(&self) -> u64 {
        self.us
    }
}
