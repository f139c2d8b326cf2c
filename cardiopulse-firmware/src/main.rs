//! Cardiopulse - Pulsatile Cardiac Pump Firmware
//!
//! Main firmware binary for RP2040-based pump controllers. Drives a
//! DM860I-style step/dir driver through repeating systole/diastole strokes
//! and takes operator commands over UART0.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use cardiopulse_core::config::MachineConfig;
use cardiopulse_core::controller::PumpController;
use cardiopulse_drivers::stepper::{StepDirConfig, StepDirDriver};

use crate::config::load_config;
use crate::tasks::EmbassyClock;

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 512]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 128]> = StaticCell::new();

/// Board wiring: step GPIO5, dir GPIO2, enable GPIO8, console GPIO0/GPIO1
const BOARD_PINS: [u8; 5] = [5, 2, 8, 0, 1];

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Cardiopulse firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();
    check_board_pins(&config);
    info!(
        "Pump config: stroke={} steps, rate={} bpm, runtime limit={:?} s",
        config.pump.stroke_steps, config.pump.heart_rate_bpm, config.pump.max_runtime_s
    );

    // Operator console
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config.serial.baud;

    let tx_buf = TX_BUF.init([0u8; 512]);
    let rx_buf = RX_BUF.init([0u8; 128]);

    let uart = BufferedUart::new(p.UART0, p.PIN_0, p.PIN_1, Irqs, tx_buf, rx_buf, uart_config);
    let (tx, rx) = uart.split();

    info!("UART initialized at {} baud", config.serial.baud);

    // Step/dir outputs start at their inactive levels; the driver sets them
    // according to the configured polarity right away
    let step = Output::new(p.PIN_5, Level::Low);
    let dir = Output::new(p.PIN_2, Level::Low);
    let enable = Output::new(p.PIN_8, Level::High);

    let driver = StepDirDriver::new(step, dir, enable, Delay, StepDirConfig::from(&config.stepper));
    info!(
        "Stepper initialized: {} steps/rev, pulse width {} ns",
        config.stepper.steps_per_revolution(),
        config.stepper.pulse_width_ns
    );

    // The cycle starts immediately
    let pump = PumpController::new(driver, &config, &EmbassyClock);

    spawner.spawn(tasks::serial_rx_task(rx)).unwrap();
    spawner.spawn(tasks::serial_tx_task(tx)).unwrap();
    spawner.spawn(tasks::control_task(pump)).unwrap();

    info!("All tasks spawned, firmware running");
}

/// Pins are fixed by the board; warn if pump.toml disagrees
fn check_board_pins(config: &MachineConfig) {
    let configured = [
        config.stepper.step_pin.pin,
        config.stepper.dir_pin.pin,
        config.stepper.enable_pin.pin,
        config.serial.tx_pin,
        config.serial.rx_pin,
    ];

    if configured != BOARD_PINS {
        warn!(
            "pump.toml pins {:?} differ from board wiring {:?}, using board wiring",
            configured, BOARD_PINS
        );
    }
}
