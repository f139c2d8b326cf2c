//! Replies sent back to the operator
//!
//! Every reply renders to a single line. Acknowledgements start with `OK`,
//! failures with `ERR`, and the status report with `STATUS`.

use core::fmt::{self, Write};

use heapless::String;

use crate::command::CommandError;
use crate::line::LineError;

/// Maximum rendered reply length in bytes, including the newline
pub const MAX_REPLY_LEN: usize = 256;

/// Snapshot of controller state for the `s` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusReport {
    pub phase: &'static str,
    pub position: i32,
    pub home: i32,
    pub delay_us: u32,
    pub step_index: u16,
    pub heart_rate_bpm: u16,
    /// Duration of one cardiac cycle at the current rate
    pub cycle_ms: u32,
    pub stroke_steps: u16,
    pub shutdown_requested: bool,
    pub complete_current_cycle: bool,
    pub cycles_completed: u32,
    pub enabled: bool,
    pub elapsed_s: u32,
}

/// A reply line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    /// Cycle (re)started
    Started,
    /// Motion stopped and motor de-energized
    Stopped,
    /// Emergency stop executed
    EmergencyStopped,
    /// Heart rate now in effect (applies from the next leg)
    HeartRate(u16),
    /// Stroke length now in effect (applies from the next leg)
    StrokeSteps(u16),
    /// Moving to a manual target
    Moving(i32),
    /// Graceful shutdown latched
    ShutdownRequested,
    /// Status snapshot
    Status(StatusReport),
    /// Command is valid but not accepted in the current phase
    NotAllowed(&'static str),
    /// Command line could not be parsed
    Error(CommandError),
    /// Input line could not be assembled
    Input(LineError),
}

impl Reply {
    /// Write the reply followed by a newline
    pub fn write_line<W: Write>(&self, out: &mut W) -> fmt::Result {
        match self {
            Reply::Started => out.write_str("OK started")?,
            Reply::Stopped => out.write_str("OK stopped")?,
            Reply::EmergencyStopped => out.write_str("OK emergency stop")?,
            Reply::HeartRate(bpm) => write!(out, "OK rate {} bpm", bpm)?,
            Reply::StrokeSteps(steps) => write!(out, "OK stroke {} steps", steps)?,
            Reply::Moving(target) => write!(out, "OK moving to {}", target)?,
            Reply::ShutdownRequested => out.write_str("OK shutdown after cycle")?,
            Reply::Status(report) => write_status(report, out)?,
            Reply::NotAllowed(phase) => write!(out, "ERR not allowed in {}", phase)?,
            Reply::Error(err) => write!(out, "ERR {}", err.as_str())?,
            Reply::Input(LineError::Overflow) => out.write_str("ERR line too long")?,
            Reply::Input(LineError::InvalidUtf8) => out.write_str("ERR invalid characters")?,
        }
        out.write_char('\n')
    }

    /// Render the reply into a bounded line buffer
    pub fn to_line(&self) -> Result<String<MAX_REPLY_LEN>, fmt::Error> {
        let mut line = String::new();
        self.write_line(&mut line)?;
        Ok(line)
    }
}

fn write_status<W: Write>(r: &StatusReport, out: &mut W) -> fmt::Result {
    write!(
        out,
        "STATUS phase={} pos={} home={} delay={}us step={} rate={}bpm cycle={}ms stroke={} \
         shutdown={} complete={} cycles={} enabled={} elapsed={}s",
        r.phase,
        r.position,
        r.home,
        r.delay_us,
        r.step_index,
        r.heart_rate_bpm,
        r.cycle_ms,
        r.stroke_steps,
        r.shutdown_requested as u8,
        r.complete_current_cycle as u8,
        r.cycles_completed,
        r.enabled as u8,
        r.elapsed_s,
    )
}
