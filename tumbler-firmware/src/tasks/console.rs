//! Console task
//!
//! Serves the command line over UART. The session only ends on a fatal
//! error; the display state is then saved, the coils released and the
//! firmware halts.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_time::Delay;

use tumbler_core::Console;
use tumbler_hal_rp2040::flash::Rp2040FlashStorage;

/// The console as wired on the board
pub type DisplayConsole =
    Console<Output<'static>, Delay, Rp2040FlashStorage<'static>, BufferedUartTx>;

/// Console task - runs the command interpreter until it fails
#[embassy_executor::task]
pub async fn console_task(mut console: DisplayConsole, mut rx: BufferedUartRx) {
    info!("Console task started");

    // Tell whoever is listening where the wheels are
    if let Err(e) = console.announce().await {
        warn!("Failed to print status banner: {}", e);
    }

    let shutdown = console.supervise(&mut rx).await;
    error!("Console stopped: {}", shutdown.cause);

    match shutdown.saved {
        Ok(()) => info!("Display state saved"),
        Err(e) => error!("Emergency save failed: {}", e),
    }

    if let Err(e) = console.display_mut().idle() {
        error!("Failed to release coils: {}", e);
    }

    defmt::panic!("Console session ended");
}
