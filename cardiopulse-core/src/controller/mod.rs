//! Pulsatile pump controller
//!
//! Owns the driver, profile buffer, emitter and governor, and advances the
//! cardiac cycle one step attempt per [`PumpController::tick`].

pub mod pump;
pub mod status;

pub use pump::PumpController;
pub use status::PumpStatus;
