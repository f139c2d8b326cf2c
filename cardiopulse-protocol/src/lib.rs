//! Serial command protocol
//!
//! This crate defines the line-oriented text protocol spoken over the
//! controller's serial port. A bench operator (or a host script) types
//! single-line commands and receives single-line replies.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌─────────┬───────────────────────────────┐
//! │ 1       │ start cardiac cycle           │
//! │ 0       │ stop and disable motor        │
//! │ e       │ emergency stop                │
//! │ s       │ print status                  │
//! │ + / -   │ heart rate ±5 BPM             │
//! │ r <bpm> │ set heart rate                │
//! │ v+ / v- │ stroke volume ±10%            │
//! │ m <n>   │ move to manual position       │
//! │ g       │ graceful shutdown after cycle │
//! └─────────┴───────────────────────────────┘
//! ```
//!
//! Lines end with `\n`; a trailing `\r` is ignored. Replies are rendered
//! into a bounded buffer so no allocation is needed on the target.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod line;
pub mod reply;

pub use command::{Command, CommandError};
pub use line::{LineError, LineReader, MAX_LINE_LEN};
pub use reply::{Reply, StatusReport, MAX_REPLY_LEN};
