//! Hardware abstraction traits
//!
//! These traits define the interface between the motion logic
//! and hardware-specific implementations.

pub mod clock;
pub mod pulse;

pub use clock::Clock;
pub use pulse::{Direction, PulseDriver};
