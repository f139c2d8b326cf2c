//! Inter-task communication channels
//!
//! Defines the static channels used between the serial tasks and the
//! control loop.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use cardiopulse_protocol::{Command, Reply};

/// Channel capacity for parsed operator commands
const COMMAND_CHANNEL_SIZE: usize = 8;

/// Channel capacity for replies waiting to be written
const REPLY_CHANNEL_SIZE: usize = 8;

/// Commands from the serial console, drained by the control loop
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Replies to the serial console
pub static REPLY_CHANNEL: Channel<CriticalSectionRawMutex, Reply, REPLY_CHANNEL_SIZE> =
    Channel::new();
