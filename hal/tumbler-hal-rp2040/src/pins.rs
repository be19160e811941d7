//! Pin allocation for config-driven coil wiring
//!
//! Motor coil pins come from `display.toml` as plain GPIO numbers. The bank
//! hands them out by number at runtime, so a typo or a pin used twice shows
//! up as a [`PinError`] instead of two drivers fighting over one line.
//!
//! GPIO 20 and 21 carry the console UART and never enter the bank.

use embassy_rp::gpio::{AnyPin, Level, Output};
use embassy_rp::peripherals;
use embassy_rp::Peri;
use embassy_rp::Peripherals;

/// Number of user GPIOs on the RP2040
pub const GPIO_COUNT: usize = 30;

/// GPIO used for console UART TX
pub const UART_TX_PIN: u8 = 20;

/// GPIO used for console UART RX
pub const UART_RX_PIN: u8 = 21;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin(u8),
    /// Pin already taken
    AlreadyTaken(u8),
    /// Pin reserved for the console UART
    Reserved(u8),
}

/// Pin bank that holds the free GPIO pins and allows taking them by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT],
}

impl PinBank {
    /// Take an output pin by number, driven low
    pub fn output(&mut self, pin_num: u8) -> Result<Output<'static>, PinError> {
        let pin = self.take(pin_num)?;
        Ok(Output::new(pin, Level::Low))
    }

    /// Take the four coil outputs of one stepper, in phase order
    pub fn coil_outputs(&mut self, pins: [u8; 4]) -> Result<[Output<'static>; 4], PinError> {
        Ok([
            self.output(pins[0])?,
            self.output(pins[1])?,
            self.output(pins[2])?,
            self.output(pins[3])?,
        ])
    }

    /// Take a pin by number
    pub fn take(&mut self, pin_num: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        if pin_num == UART_TX_PIN || pin_num == UART_RX_PIN {
            return Err(PinError::Reserved(pin_num));
        }
        self.pins
            .get_mut(pin_num as usize)
            .ok_or(PinError::InvalidPin(pin_num))?
            .take()
            .ok_or(PinError::AlreadyTaken(pin_num))
    }
}

/// Console UART peripherals split off before the bank is built
pub struct ConsolePeripherals {
    pub uart: Peri<'static, peripherals::UART1>,
    pub tx: Peri<'static, peripherals::PIN_20>,
    pub rx: Peri<'static, peripherals::PIN_21>,
}

/// Non-GPIO peripherals that remain after creating the bank
pub struct RemainingPeripherals {
    pub flash: Peri<'static, peripherals::FLASH>,
    pub dma_ch0: Peri<'static, peripherals::DMA_CH0>,
    pub console: ConsolePeripherals,
}

/// Split the chip peripherals into a pin bank and everything else
pub fn split(p: Peripherals) -> (PinBank, RemainingPeripherals) {
    let bank = PinBank {
        pins: [
            Some(p.PIN_0.into()),
            Some(p.PIN_1.into()),
            Some(p.PIN_2.into()),
            Some(p.PIN_3.into()),
            Some(p.PIN_4.into()),
            Some(p.PIN_5.into()),
            Some(p.PIN_6.into()),
            Some(p.PIN_7.into()),
            Some(p.PIN_8.into()),
            Some(p.PIN_9.into()),
            Some(p.PIN_10.into()),
            Some(p.PIN_11.into()),
            Some(p.PIN_12.into()),
            Some(p.PIN_13.into()),
            Some(p.PIN_14.into()),
            Some(p.PIN_15.into()),
            Some(p.PIN_16.into()),
            Some(p.PIN_17.into()),
            Some(p.PIN_18.into()),
            Some(p.PIN_19.into()),
            None, // UART1 TX
            None, // UART1 RX
            Some(p.PIN_22.into()),
            Some(p.PIN_23.into()),
            Some(p.PIN_24.into()),
            Some(p.PIN_25.into()),
            Some(p.PIN_26.into()),
            Some(p.PIN_27.into()),
            Some(p.PIN_28.into()),
            Some(p.PIN_29.into()),
        ],
    };
    let remaining = RemainingPeripherals {
        flash: p.FLASH,
        dma_ch0: p.DMA_CH0,
        console: ConsolePeripherals {
            uart: p.UART1,
            tx: p.PIN_20,
            rx: p.PIN_21,
        },
    };
    (bank, remaining)
}
