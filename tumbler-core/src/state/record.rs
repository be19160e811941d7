//! Persisted display state
//!
//! The record is one text line of six integers:
//!
//! ```text
//! h_digit,h_phase, t_digit,t_phase,u_digit,u_phase
//! ```
//!
//! The single space after the second comma is part of the format records
//! have always been written in. Decoding trims whitespace around every field,
//! so either spacing reads back.

use core::fmt::Write;
use heapless::String;

use crate::motion::cylinder::DIGITS;
use crate::motion::stepper::PHASE_COUNT;

/// Longest encoded record
pub const MAX_RECORD_LEN: usize = 32;

/// Fields in a record
const FIELD_COUNT: usize = 6;

/// Errors decoding a stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Record is not UTF-8 text
    InvalidUtf8,
    /// Fewer than six fields
    MissingField,
    /// A field is not an integer
    InvalidNumber,
    /// A digit outside 0-9 or a phase outside 0-7
    OutOfRange,
}

/// Digit and coil phase of one wheel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WheelState {
    pub digit: u8,
    pub phase: u8,
}

/// Physical state of the whole display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StateRecord {
    pub hundreds: WheelState,
    pub tens: WheelState,
    pub units: WheelState,
}

impl StateRecord {
    /// Encode as a single line of text
    pub fn encode(&self) -> String<MAX_RECORD_LEN> {
        let mut text = String::new();
        // Six single-digit fields always fit
        let _ = write!(
            text,
            "{},{}, {},{},{},{}",
            self.hundreds.digit,
            self.hundreds.phase,
            self.tens.digit,
            self.tens.phase,
            self.units.digit,
            self.units.phase,
        );
        text
    }

    /// Decode from stored bytes
    ///
    /// Only the first line is read and fields past the sixth are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, RecordError> {
        let text = core::str::from_utf8(bytes).map_err(|_| RecordError::InvalidUtf8)?;
        let line = text.lines().next().unwrap_or("");

        let mut values = [0u8; FIELD_COUNT];
        let mut fields = line.split(',');
        for (i, value) in values.iter_mut().enumerate() {
            let field = fields.next().ok_or(RecordError::MissingField)?;
            let limit = if i % 2 == 0 { DIGITS } else { PHASE_COUNT };
            *value = parse_field(field, limit)?;
        }

        let [hd, hp, td, tp, ud, up] = values;
        Ok(Self {
            hundreds: WheelState { digit: hd, phase: hp },
            tens: WheelState { digit: td, phase: tp },
            units: WheelState { digit: ud, phase: up },
        })
    }
}

fn parse_field(field: &str, limit: u8) -> Result<u8, RecordError> {
    let value: i32 = field
        .trim()
        .parse()
        .map_err(|_| RecordError::InvalidNumber)?;
    u8::try_from(value)
        .ok()
        .filter(|&v| v < limit)
        .ok_or(RecordError::OutOfRange)
}
