//! Tumbler - Mechanical Cylinder Display Firmware
//!
//! Drives three digit wheels, one 28BYJ-48 style stepper each, and serves
//! a line-oriented command console over UART. The wheel positions are kept
//! in flash so the display survives a power cycle.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::{Delay, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use tumbler_core::config::MotorConfig;
use tumbler_core::{Console, Cylinder, Display, StepperMotor};
use tumbler_hal_rp2040::flash::Rp2040FlashStorage;
use tumbler_hal_rp2040::pins::{self, PinBank};

use crate::config::DISPLAY_CONFIG;

mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Tumbler firmware starting...");

    let config = DISPLAY_CONFIG;
    info!("Display config: {}", config);

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    let (mut bank, rest) = pins::split(p);
    info!("Peripherals initialized");

    let hundreds = motor(&mut bank, &config.hundreds);
    let tens = motor(&mut bank, &config.tens);
    let units = motor(&mut bank, &config.units);

    let storage = Rp2040FlashStorage::new(rest.flash, rest.dma_ch0);
    let mut display = Display::new(
        Cylinder::new(hundreds),
        Cylinder::new(tens),
        Cylinder::new(units),
        Delay,
        storage,
    );

    // Restore where the wheels were left, otherwise assume all zeros
    match display.load_state().await {
        Ok(record) => info!("Display state restored: {}", record),
        Err(e) => warn!("No saved display state ({}), assuming 000", e),
    }

    // Setup UART for the command console
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config.serial.baudrate;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let console_pins = rest.console;
    let uart = Uart::new_blocking(console_pins.uart, console_pins.tx, console_pins.rx, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized at {} baud", config.serial.baudrate);

    let console = Console::new(display, Delay, tx);
    spawner.must_spawn(tasks::console_task(console, rx));

    info!("All tasks spawned, entering main loop");

    // Main loop - heartbeat
    loop {
        Timer::after_secs(60).await;
        trace!("Heartbeat");
    }
}

/// Claim a motor's coil pins and build its driver
fn motor(bank: &mut PinBank, config: &MotorConfig) -> StepperMotor<Output<'static>, Delay> {
    match bank.coil_outputs(config.pins) {
        Ok(pins) => StepperMotor::from_config(pins, Delay, config),
        Err(e) => defmt::panic!("Cannot claim coil pins {}: {}", config.pins, e),
    }
}
