//! Phase definitions and the transition function
//!
//! ```text
//!  SystoleAccel ─► SystoleDecel ─► DiastoleAccel ─► DiastoleDecel
//!       ▲                                               │
//!       │            off home ┌─────────────────────────┤ at home
//!       │                     ▼                         ▼
//!       │               ReturnToStart ───────────► CycleComplete
//!       │                     │                         │
//!       └─────────────────────┼─────────────────────────┘
//!                             │ shutdown pending
//!                             ▼
//!                         Shutdown ─► HoldPosition
//! ```
//!
//! `Stopped(_)` and `ReturnToManualPosition` are entered only by operator
//! commands.

use super::events::{Event, Guards};
use crate::motion::LegSegment;
use crate::traits::Direction;

/// Cycle phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CyclePhase {
    /// Contraction, speeding up (clockwise)
    SystoleAccel,
    /// Contraction, slowing down (clockwise)
    SystoleDecel,
    /// Relaxation, speeding up (counter-clockwise)
    DiastoleAccel,
    /// Relaxation, slowing down (counter-clockwise)
    DiastoleDecel,
    /// Correcting residual error back to home
    ReturnToStart,
    /// Between cycles, at home
    CycleComplete,
    /// Parking at home after a graceful shutdown request
    Shutdown,
    /// Energized and stationary, waiting for a command
    HoldPosition,
    /// Moving to an operator-supplied position
    ReturnToManualPosition,
    /// Not stepping
    Stopped(StopReason),
}

/// A phase change and the event that caused it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub from: CyclePhase,
    pub to: CyclePhase,
    pub event: Event,
}

/// Why the controller is stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopReason {
    /// Stop command, motor de-energized, position retained
    Commanded,
    /// Emergency stop, motor de-energized, position zeroed
    EmergencyStop,
}

impl CyclePhase {
    /// Name used in status reports
    pub const fn name(&self) -> &'static str {
        match self {
            CyclePhase::SystoleAccel => "SystoleAccel",
            CyclePhase::SystoleDecel => "SystoleDecel",
            CyclePhase::DiastoleAccel => "DiastoleAccel",
            CyclePhase::DiastoleDecel => "DiastoleDecel",
            CyclePhase::ReturnToStart => "ReturnToStart",
            CyclePhase::CycleComplete => "CycleComplete",
            CyclePhase::Shutdown => "Shutdown",
            CyclePhase::HoldPosition => "HoldPosition",
            CyclePhase::ReturnToManualPosition => "ReturnToManualPosition",
            CyclePhase::Stopped(StopReason::Commanded) => "Stopped",
            CyclePhase::Stopped(StopReason::EmergencyStop) => "EmergencyStop",
        }
    }

    /// Direction and profile segment for the four stroke legs
    pub fn leg(&self) -> Option<(Direction, LegSegment)> {
        match self {
            CyclePhase::SystoleAccel => Some((Direction::Clockwise, LegSegment::Accelerate)),
            CyclePhase::SystoleDecel => Some((Direction::Clockwise, LegSegment::Decelerate)),
            CyclePhase::DiastoleAccel => {
                Some((Direction::CounterClockwise, LegSegment::Accelerate))
            }
            CyclePhase::DiastoleDecel => {
                Some((Direction::CounterClockwise, LegSegment::Decelerate))
            }
            _ => None,
        }
    }

    /// Check if this phase belongs to systole
    pub fn is_systole(&self) -> bool {
        matches!(self, CyclePhase::SystoleAccel | CyclePhase::SystoleDecel)
    }

    /// Check if the motor should be energized in this phase
    pub fn motor_enabled(&self) -> bool {
        !self.is_stopped()
    }

    /// Check if this is a stopped phase
    pub fn is_stopped(&self) -> bool {
        matches!(self, CyclePhase::Stopped(_))
    }

    /// Process an event and return the next phase
    ///
    /// Events that do not apply to the current phase leave it unchanged.
    pub fn transition(self, event: Event) -> Self {
        use CyclePhase::*;
        use Event::*;

        match (self, event) {
            // Always available
            (_, EmergencyStop) => Stopped(StopReason::EmergencyStop),

            // Operator commands
            (Stopped(_) | HoldPosition, Start) => SystoleAccel,
            (Stopped(StopReason::Commanded) | HoldPosition | ReturnToManualPosition, MoveToManual) => {
                ReturnToManualPosition
            }
            (Stopped(_), Stop) => self,
            (_, Stop) => Stopped(StopReason::Commanded),

            // Stroke legs
            (SystoleAccel, LegExhausted(_)) => SystoleDecel,
            (SystoleDecel, LegExhausted(_)) => DiastoleAccel,
            (DiastoleAccel, LegExhausted(_)) => DiastoleDecel,
            (DiastoleDecel, LegExhausted(g)) => after_stroke(g),

            // Homing
            (ReturnToStart, HomeReached(g)) => {
                if g.shutdown_pending {
                    Shutdown
                } else {
                    CycleComplete
                }
            }
            (CycleComplete, Advance(g)) => {
                if g.shutdown_pending {
                    Shutdown
                } else {
                    SystoleAccel
                }
            }
            (Shutdown, HomeReached(_)) => HoldPosition,

            // Manual positioning
            (ReturnToManualPosition, TargetReached) => HoldPosition,

            // Default: stay in current phase
            _ => self,
        }
    }
}

fn after_stroke(g: Guards) -> CyclePhase {
    if g.shutdown_pending {
        CyclePhase::Shutdown
    } else if !g.at_home {
        CyclePhase::ReturnToStart
    } else {
        CyclePhase::CycleComplete
    }
}
