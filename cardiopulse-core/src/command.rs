//! Operator command dispatch
//!
//! Translates parsed [`Command`]s into controller entry point calls. All
//! parameter clamping happens here so the controller only ever sees values
//! inside [`limits`].

use cardiopulse_protocol::{Command, Reply, StatusReport};

use crate::config::limits;
use crate::controller::PumpController;
use crate::state::{CyclePhase, Transition};
use crate::traits::{Clock, PulseDriver};

/// Result of applying one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Outcome {
    /// Line to send back to the operator
    pub reply: Reply,
    /// Phase change caused by the command, if any
    pub transition: Option<Transition>,
}

impl Outcome {
    fn reply(reply: Reply) -> Self {
        Self {
            reply,
            transition: None,
        }
    }
}

/// Apply `command` to the controller
pub fn apply<D: PulseDriver, C: Clock>(
    ctl: &mut PumpController<D>,
    command: Command,
    clock: &C,
) -> Outcome {
    let refused = Reply::NotAllowed(ctl.phase().name());

    match command {
        Command::StartCycle => match ctl.start_cycle(clock) {
            Some(t) => Outcome {
                reply: Reply::Started,
                transition: Some(t),
            },
            None => Outcome::reply(refused),
        },
        Command::Stop => Outcome {
            transition: ctl.stop(),
            reply: Reply::Stopped,
        },
        Command::EmergencyStop => Outcome {
            transition: ctl.emergency_stop(),
            reply: Reply::EmergencyStopped,
        },
        Command::Status => {
            let status = ctl.status(clock);
            Outcome::reply(Reply::Status(StatusReport::from(&status)))
        }
        Command::RateUp => {
            let bpm = limits::clamp_heart_rate(
                ctl.heart_rate_bpm().saturating_add(limits::HEART_RATE_STEP_BPM),
            );
            ctl.set_heart_rate(bpm);
            Outcome::reply(Reply::HeartRate(bpm))
        }
        Command::RateDown => {
            let bpm = limits::clamp_heart_rate(
                ctl.heart_rate_bpm().saturating_sub(limits::HEART_RATE_STEP_BPM),
            );
            ctl.set_heart_rate(bpm);
            Outcome::reply(Reply::HeartRate(bpm))
        }
        Command::SetRate(requested) => {
            let bpm = limits::clamp_heart_rate(requested);
            ctl.set_heart_rate(bpm);
            Outcome::reply(Reply::HeartRate(bpm))
        }
        Command::VolumeUp => {
            let steps = limits::stroke_up(ctl.stroke_steps());
            ctl.set_stroke_steps(steps);
            Outcome::reply(Reply::StrokeSteps(steps))
        }
        Command::VolumeDown => {
            let steps = limits::stroke_down(ctl.stroke_steps());
            ctl.set_stroke_steps(steps);
            Outcome::reply(Reply::StrokeSteps(steps))
        }
        Command::MoveTo(requested) => {
            let target =
                limits::clamp_manual_target(requested, ctl.home(), ctl.manual_range_steps());
            let transition = ctl.move_to(target);
            if ctl.phase() == CyclePhase::ReturnToManualPosition {
                Outcome {
                    reply: Reply::Moving(target),
                    transition,
                }
            } else {
                Outcome::reply(refused)
            }
        }
        Command::Shutdown => {
            if ctl.phase().is_stopped() {
                Outcome::reply(refused)
            } else {
                ctl.request_shutdown();
                Outcome::reply(Reply::ShutdownRequested)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MachineConfig;
    use crate::state::StopReason;
    use crate::testing::{ManualClock, MockDriver};

    fn controller(clock: &ManualClock) -> PumpController<MockDriver> {
        PumpController::new(MockDriver::new(), &MachineConfig::default(), clock)
    }

    #[test]
    fn test_rate_commands_clamp() {
        let clock = ManualClock::new();
        let mut ctl = controller(&clock);

        assert_eq!(apply(&mut ctl, Command::RateUp, &clock).reply, Reply::HeartRate(65));
        assert_eq!(apply(&mut ctl, Command::SetRate(500), &clock).reply, Reply::HeartRate(120));
        assert_eq!(apply(&mut ctl, Command::RateUp, &clock).reply, Reply::HeartRate(120));
        assert_eq!(apply(&mut ctl, Command::SetRate(0), &clock).reply, Reply::HeartRate(30));
        assert_eq!(apply(&mut ctl, Command::RateDown, &clock).reply, Reply::HeartRate(30));
        assert_eq!(ctl.heart_rate_bpm(), 30);
    }

    #[test]
    fn test_volume_commands() {
        let clock = ManualClock::new();
        let mut ctl = controller(&clock);

        assert_eq!(apply(&mut ctl, Command::VolumeUp, &clock).reply, Reply::StrokeSteps(330));
        assert_eq!(apply(&mut ctl, Command::VolumeDown, &clock).reply, Reply::StrokeSteps(297));
        for _ in 0..50 {
            apply(&mut ctl, Command::VolumeUp, &clock);
        }
        assert_eq!(ctl.stroke_steps(), limits::MAX_STROKE_STEPS);
        for _ in 0..100 {
            apply(&mut ctl, Command::VolumeDown, &clock);
        }
        assert_eq!(ctl.stroke_steps(), limits::MIN_STROKE_STEPS);
    }

    #[test]
    fn test_start_stop_commands() {
        let clock = ManualClock::new();
        let mut ctl = controller(&clock);

        let out = apply(&mut ctl, Command::StartCycle, &clock);
        assert_eq!(out.reply, Reply::NotAllowed("SystoleAccel"));
        assert!(out.transition.is_none());

        let out = apply(&mut ctl, Command::Stop, &clock);
        assert_eq!(out.reply, Reply::Stopped);
        assert_eq!(out.transition.unwrap().to, CyclePhase::Stopped(StopReason::Commanded));

        let out = apply(&mut ctl, Command::StartCycle, &clock);
        assert_eq!(out.reply, Reply::Started);
        assert_eq!(ctl.phase(), CyclePhase::SystoleAccel);
    }

    #[test]
    fn test_emergency_stop_command() {
        let clock = ManualClock::new();
        let mut ctl = controller(&clock);
        let out = apply(&mut ctl, Command::EmergencyStop, &clock);
        assert_eq!(out.reply, Reply::EmergencyStopped);
        assert!(!ctl.driver().enabled);

        // Shutdown and manual moves need a fresh start
        let out = apply(&mut ctl, Command::Shutdown, &clock);
        assert_eq!(out.reply, Reply::NotAllowed("EmergencyStop"));
        let out = apply(&mut ctl, Command::MoveTo(10), &clock);
        assert_eq!(out.reply, Reply::NotAllowed("EmergencyStop"));
    }

    #[test]
    fn test_move_to_clamped_to_one_revolution() {
        let clock = ManualClock::new();
        let mut ctl = controller(&clock);
        apply(&mut ctl, Command::Stop, &clock);

        let out = apply(&mut ctl, Command::MoveTo(10_000), &clock);
        assert_eq!(out.reply, Reply::Moving(3_200));
        assert_eq!(ctl.manual_target(), 3_200);

        // Retarget while moving
        let out = apply(&mut ctl, Command::MoveTo(-50), &clock);
        assert_eq!(out.reply, Reply::Moving(-50));
        assert!(out.transition.is_none());
        assert_eq!(ctl.manual_target(), -50);
    }

    #[test]
    fn test_shutdown_command_latches() {
        let clock = ManualClock::new();
        let mut ctl = controller(&clock);
        let out = apply(&mut ctl, Command::Shutdown, &clock);
        assert_eq!(out.reply, Reply::ShutdownRequested);
        assert!(ctl.governor().shutdown_requested());
        assert_eq!(ctl.phase(), CyclePhase::SystoleAccel);
    }

    #[test]
    fn test_status_command() {
        let clock = ManualClock::new();
        let mut ctl = controller(&clock);
        match apply(&mut ctl, Command::Status, &clock).reply {
            Reply::Status(report) => {
                assert_eq!(report.phase, "SystoleAccel");
                assert_eq!(report.stroke_steps, 300);
                assert_eq!(report.cycle_ms, 1_000);
                assert!(report.enabled);
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }
}
