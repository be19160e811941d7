//! In-memory stand-ins for pins, delays, flash and the serial line

extern crate std;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::digital::{self, OutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{ErrorKind, ErrorType, Read, Write};
use tumbler_hal::{FlashError, FlashStorage, StorageKey};

use crate::display::Display;
use crate::motion::{Cylinder, StepperMotor};

/// Output pin whose level can be observed through clones
#[derive(Clone, Default)]
pub struct FakePin {
    level: Rc<Cell<bool>>,
    broken: bool,
}

impl FakePin {
    /// A pin that fails every write
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn is_high(&self) -> bool {
        self.level.get()
    }
}

impl digital::ErrorType for FakePin {
    type Error = digital::ErrorKind;
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if self.broken {
            return Err(digital::ErrorKind::Other);
        }
        self.level.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if self.broken {
            return Err(digital::ErrorKind::Other);
        }
        self.level.set(true);
        Ok(())
    }
}

/// Four fresh pins plus observers sharing their levels
pub fn coil_pins() -> ([FakePin; 4], [FakePin; 4]) {
    let pins: [FakePin; 4] = Default::default();
    let observers = pins.clone();
    (pins, observers)
}

/// Levels of four observed pins, A first
pub fn levels(pins: &[FakePin; 4]) -> [u8; 4] {
    pins.each_ref().map(|pin| pin.is_high() as u8)
}

/// Delay that completes at once and records every pause in milliseconds
#[derive(Clone, Default)]
pub struct FakeDelay {
    log: Rc<RefCell<Vec<u32>>>,
    stalled: bool,
}

impl FakeDelay {
    /// A delay that never completes
    pub fn stalled() -> Self {
        Self {
            stalled: true,
            ..Self::default()
        }
    }

    pub fn pauses(&self) -> Vec<u32> {
        self.log.borrow().clone()
    }
}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.delay_ms(ns / 1_000_000).await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(ms);
        if self.stalled {
            core::future::pending::<()>().await;
        }
    }
}

/// Flash holding at most one value per key, shared between clones
#[derive(Clone, Default)]
pub struct MemoryFlash {
    slot: Rc<RefCell<Option<Vec<u8>>>>,
    read_only: bool,
}

impl MemoryFlash {
    /// Flash that rejects every write
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn with_record(text: &str) -> Self {
        let flash = Self::default();
        flash.slot.replace(Some(text.as_bytes().to_vec()));
        flash
    }

    pub fn record(&self) -> Option<std::string::String> {
        self.slot
            .borrow()
            .as_ref()
            .map(|bytes| std::string::String::from_utf8_lossy(bytes).into_owned())
    }
}

impl FlashStorage for MemoryFlash {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        assert_eq!(key, StorageKey::DisplayState);
        let slot = self.slot.borrow();
        let data = slot.as_ref().ok_or(FlashError::NotFound)?;
        if buffer.len() < data.len() {
            return Err(FlashError::BufferTooSmall);
        }
        buffer[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        assert_eq!(key, StorageKey::DisplayState);
        if self.read_only {
            return Err(FlashError::Flash);
        }
        self.slot.replace(Some(data.to_vec()));
        Ok(())
    }
}

/// Scripted serial input, ends with `Ok(0)` or a transport error
pub struct ScriptedInput {
    data: Vec<u8>,
    pos: usize,
    fail_at_end: bool,
}

impl ScriptedInput {
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            fail_at_end: false,
        }
    }

    /// Input whose read fails once the script is exhausted
    pub fn failing(data: &[u8]) -> Self {
        Self {
            fail_at_end: true,
            ..Self::new(data)
        }
    }
}

impl ErrorType for ScriptedInput {
    type Error = ErrorKind;
}

impl Read for ScriptedInput {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let rest = &self.data[self.pos..];
        if rest.is_empty() && self.fail_at_end {
            return Err(ErrorKind::BrokenPipe);
        }
        // Small chunks, like a UART delivering a few bytes at a time
        let n = rest.len().min(buf.len()).min(3);
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }
}

/// Serial output collecting everything written
#[derive(Clone, Default)]
pub struct Transcript {
    bytes: Rc<RefCell<Vec<u8>>>,
}

impl Transcript {
    pub fn text(&self) -> std::string::String {
        std::string::String::from_utf8_lossy(&self.bytes.borrow()).into_owned()
    }
}

impl ErrorType for Transcript {
    type Error = ErrorKind;
}

impl Write for Transcript {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.bytes.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }
}

pub type FakeMotor = StepperMotor<FakePin, FakeDelay>;
pub type FakeDisplay = Display<FakePin, FakeDelay, MemoryFlash>;

/// A display wired to fakes, with handles to observe them
pub struct Rig {
    pub display: FakeDisplay,
    /// Coil observers: hundreds, tens, units
    pub coils: [[FakePin; 4]; 3],
    pub clock: FakeDelay,
    pub flash: MemoryFlash,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_flash(MemoryFlash::default())
    }

    pub fn with_flash(flash: MemoryFlash) -> Self {
        let clock = FakeDelay::default();
        let (h, h_obs) = coil_pins();
        let (t, t_obs) = coil_pins();
        let (u, u_obs) = coil_pins();
        let display = Display::new(
            Cylinder::new(StepperMotor::new(h, clock.clone())),
            Cylinder::new(StepperMotor::new(t, clock.clone())),
            Cylinder::new(StepperMotor::new(u, clock.clone())),
            clock.clone(),
            flash.clone(),
        );
        Self {
            display,
            coils: [h_obs, t_obs, u_obs],
            clock,
            flash,
        }
    }
}
