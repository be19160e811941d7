//! Board configuration types
//!
//! Describes how the three steppers are wired and how fast they step. The
//! firmware reads these values from `display.toml` at build time; the
//! defaults match the reference board.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Highest GPIO number accepted in a pin list
pub const MAX_GPIO: u8 = 29;

/// One stepper's wiring and speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotorConfig {
    /// GPIOs driving coils A..D, in half-step sequence order
    pub pins: [u8; 4],
    /// Pause after each half-step, in milliseconds
    pub delay_ms: u32,
}

impl MotorConfig {
    /// Step delay the reference board runs at
    pub const DEFAULT_DELAY_MS: u32 = 16;

    /// Create a config with the default step delay
    pub const fn new(pins: [u8; 4]) -> Self {
        Self {
            pins,
            delay_ms: Self::DEFAULT_DELAY_MS,
        }
    }
}

/// Command line settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SerialConfig {
    pub baudrate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self { baudrate: 115_200 }
    }
}

/// Complete display board configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    pub hundreds: MotorConfig,
    pub tens: MotorConfig,
    pub units: MotorConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub serial: SerialConfig,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            hundreds: MotorConfig::new([8, 9, 10, 11]),
            tens: MotorConfig::new([4, 5, 6, 7]),
            units: MotorConfig::new([0, 1, 2, 3]),
            serial: SerialConfig::default(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// GPIO number above [`MAX_GPIO`]
    InvalidPin(u8),
    /// GPIO assigned to more than one coil
    DuplicatePin(u8),
    /// A motor would step with no pause at all
    ZeroDelay,
    /// Baud rate of zero
    InvalidBaudrate,
}

impl DisplayConfig {
    /// All twelve coil pins, hundreds first
    pub fn coil_pins(&self) -> [u8; 12] {
        let mut pins = [0u8; 12];
        pins[..4].copy_from_slice(&self.hundreds.pins);
        pins[4..8].copy_from_slice(&self.tens.pins);
        pins[8..].copy_from_slice(&self.units.pins);
        pins
    }

    /// Check pin ranges, pin uniqueness and timings
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pins = self.coil_pins();
        for (i, &pin) in pins.iter().enumerate() {
            if pin > MAX_GPIO {
                return Err(ConfigError::InvalidPin(pin));
            }
            if pins[..i].contains(&pin) {
                return Err(ConfigError::DuplicatePin(pin));
            }
        }

        for motor in [&self.hundreds, &self.tens, &self.units] {
            if motor.delay_ms == 0 {
                return Err(ConfigError::ZeroDelay);
            }
        }

        if self.serial.baudrate == 0 {
            return Err(ConfigError::InvalidBaudrate);
        }

        Ok(())
    }
}
