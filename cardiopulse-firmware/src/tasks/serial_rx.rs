//! Operator console receive task
//!
//! Splits UART input into lines and forwards parsed commands to the
//! control loop. Parse errors are answered directly.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use cardiopulse_protocol::{Command, LineReader, Reply};

use crate::channels::{COMMAND_CHANNEL, REPLY_CHANNEL};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Serial RX task - receives and parses operator commands
#[embassy_executor::task]
pub async fn serial_rx_task(mut rx: BufferedUartRx) {
    info!("Serial RX task started");

    let mut reader = LineReader::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match reader.feed(byte) {
                        Ok(Some(line)) => handle_line(&line).await,
                        Ok(None) => {}
                        Err(e) => {
                            warn!("Line error: {:?}", e);
                            send_reply(Reply::Input(e));
                        }
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}

async fn handle_line(line: &str) {
    match Command::parse(line) {
        Ok(cmd) => {
            debug!("Command: {:?}", cmd);
            // Emergency stop must never be dropped
            if cmd == Command::EmergencyStop {
                COMMAND_CHANNEL.send(cmd).await;
            } else if COMMAND_CHANNEL.try_send(cmd).is_err() {
                warn!("Command channel full, dropping command");
            }
        }
        Err(e) => {
            debug!("Rejected line: {:?}", e);
            send_reply(Reply::Error(e));
        }
    }
}

fn send_reply(reply: Reply) {
    if REPLY_CHANNEL.try_send(reply).is_err() {
        warn!("Reply channel full, dropping reply");
    }
}
