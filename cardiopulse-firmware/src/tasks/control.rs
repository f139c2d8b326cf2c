//! Pump control task
//!
//! Owns the controller. Each pass drains pending commands, runs one tick
//! and yields so the serial tasks get to run. While the pump is stopped or
//! holding position the task sleeps on the command channel instead.

use defmt::*;
use embassy_futures::yield_now;
use embassy_rp::gpio::Output;
use embassy_time::{Delay, Instant};

use cardiopulse_core::command;
use cardiopulse_core::controller::PumpController;
use cardiopulse_core::state::{CyclePhase, Transition};
use cardiopulse_core::traits::Clock;
use cardiopulse_drivers::stepper::StepDirDriver;
use cardiopulse_protocol::Command;

use crate::channels::{COMMAND_CHANNEL, REPLY_CHANNEL};

/// Step/dir driver on RP2040 GPIO with a busy-wait delay
pub type PumpDriver = StepDirDriver<Output<'static>, Output<'static>, Output<'static>, Delay>;

/// Monotonic clock backed by the embassy time driver (1 MHz tick)
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_us(&self) -> u64 {
        Instant::now().as_micros()
    }

    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

/// Control task - runs the cardiac cycle
#[embassy_executor::task]
pub async fn control_task(mut pump: PumpController<PumpDriver>) {
    info!("Control task started in {}", pump.phase().name());

    let clock = EmbassyClock;

    loop {
        if is_idle(pump.phase()) {
            let cmd = COMMAND_CHANNEL.receive().await;
            handle_command(&mut pump, cmd, &clock);
        }

        while let Ok(cmd) = COMMAND_CHANNEL.try_receive() {
            handle_command(&mut pump, cmd, &clock);
        }

        let was_latched = pump.governor().shutdown_requested();

        if let Some(t) = pump.tick(&clock) {
            log_transition(&t);
        }

        if !was_latched && pump.governor().shutdown_requested() {
            info!(
                "Runtime limit reached after {} cycles, finishing current cycle",
                pump.cycles_completed()
            );
        }

        yield_now().await;
    }
}

/// Phases with nothing to do until a command arrives
fn is_idle(phase: CyclePhase) -> bool {
    phase.is_stopped() || phase == CyclePhase::HoldPosition
}

fn handle_command(pump: &mut PumpController<PumpDriver>, cmd: Command, clock: &EmbassyClock) {
    let outcome = command::apply(pump, cmd, clock);
    if cmd.is_query() {
        trace!("{:?} -> {:?}", cmd, outcome.reply);
    } else {
        debug!("{:?} -> {:?}", cmd, outcome.reply);
    }

    if let Some(t) = outcome.transition {
        log_transition(&t);
    }

    if REPLY_CHANNEL.try_send(outcome.reply).is_err() {
        warn!("Reply channel full, dropping reply");
    }
}

fn log_transition(t: &Transition) {
    match t.to {
        CyclePhase::Stopped(_) => warn!("{} -> {} on {:?}", t.from.name(), t.to.name(), t.event),
        CyclePhase::SystoleAccel | CyclePhase::HoldPosition | CyclePhase::Shutdown => {
            info!("{} -> {} on {:?}", t.from.name(), t.to.name(), t.event)
        }
        _ => debug!("{} -> {} on {:?}", t.from.name(), t.to.name(), t.event),
    }
}
