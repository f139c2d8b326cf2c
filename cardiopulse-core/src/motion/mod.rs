//! Motion generation
//!
//! Step-delay profiles, non-blocking pulse emission and the position
//! counter they maintain.

pub mod emitter;
pub mod position;
pub mod profile;

pub use emitter::StepEmitter;
pub use position::PositionCounter;
pub use profile::{LegSegment, MotionProfile, ProfileShape, MAX_PROFILE_LEN};
