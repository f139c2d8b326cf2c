//! Board-agnostic core logic for the pulsatile pump firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (pulse driver, clock)
//! - Cardiac cycle phase state machine
//! - Sinusoidal step-delay profile generation
//! - Non-blocking step emission and position tracking
//! - Runtime governor and homing policy
//! - Configuration types and the `pump.toml` parser
//! - Operator command dispatch

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod config;
pub mod controller;
pub mod motion;
pub mod safety;
pub mod state;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;
