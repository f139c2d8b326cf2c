//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in cardiopulse-core:
//!
//! - Step/direction pulse drivers (DM860I, TB6600, A4988 and similar)

#![no_std]
#![deny(unsafe_code)]

pub mod stepper;
