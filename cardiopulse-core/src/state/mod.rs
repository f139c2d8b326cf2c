//! Cardiac cycle state machine
//!
//! Defines the phase sequence of the pump. The transition function is
//! explicit, finite, and deterministic; the controller supplies the guard
//! values each event depends on.

pub mod events;
pub mod machine;

pub use events::{Event, Guards};
pub use machine::{CyclePhase, StopReason, Transition};
