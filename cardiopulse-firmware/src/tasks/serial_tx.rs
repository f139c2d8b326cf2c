//! Operator console transmit task
//!
//! Writes replies to the UART, one line each.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::REPLY_CHANNEL;

/// Serial TX task - renders replies queued by the other tasks
#[embassy_executor::task]
pub async fn serial_tx_task(mut tx: BufferedUartTx) {
    info!("Serial TX task started");

    loop {
        let reply = REPLY_CHANNEL.receive().await;

        let line = match reply.to_line() {
            Ok(line) => line,
            Err(_) => {
                warn!("Reply does not fit a line: {:?}", reply);
                continue;
            }
        };

        if let Err(e) = tx.write_all(line.as_bytes()).await {
            warn!("Failed to send reply: {:?}", e);
        } else {
            trace!("TX: {} bytes", line.len());
        }
    }
}
