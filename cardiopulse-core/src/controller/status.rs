//! Controller status snapshot

use cardiopulse_protocol::StatusReport;

use crate::state::CyclePhase;

/// Point-in-time view of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PumpStatus {
    pub phase: CyclePhase,
    pub position: i32,
    pub home: i32,
    /// Delay most recently required by the active phase
    pub current_delay_us: u32,
    pub step_index: u16,
    /// Length of the active leg
    pub leg_steps: u16,
    pub heart_rate_bpm: u16,
    /// Stroke that the next leg will use
    pub stroke_steps: u16,
    pub shutdown_requested: bool,
    pub complete_current_cycle: bool,
    pub cycles_completed: u32,
    pub enabled: bool,
    /// Milliseconds since the session started
    pub elapsed_ms: u64,
}

impl From<&PumpStatus> for StatusReport {
    fn from(s: &PumpStatus) -> Self {
        StatusReport {
            phase: s.phase.name(),
            position: s.position,
            home: s.home,
            delay_us: s.current_delay_us,
            step_index: s.step_index,
            heart_rate_bpm: s.heart_rate_bpm,
            cycle_ms: 60_000 / s.heart_rate_bpm.max(1) as u32,
            stroke_steps: s.stroke_steps,
            shutdown_requested: s.shutdown_requested,
            complete_current_cycle: s.complete_current_cycle,
            cycles_completed: s.cycles_completed,
            enabled: s.enabled,
            elapsed_s: (s.elapsed_ms / 1_000).min(u32::MAX as u64) as u32,
        }
    }
}
