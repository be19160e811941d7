//! Line framing for NORMAL-mode input
//!
//! Bytes are accumulated until `\n`. A line longer than [`MAX_LINE_LEN`]
//! is dropped as a whole: the buffer swallows everything up to the next
//! newline and then reports [`LineError::TooLong`] once.

use heapless::{String, Vec};

/// Longest accepted command line, excluding the newline
pub const MAX_LINE_LEN: usize = 64;

/// A complete command line
pub type Line = String<MAX_LINE_LEN>;

/// Errors that can occur while framing a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line exceeded the buffer and was discarded
    TooLong,
    /// Line is not valid UTF-8
    InvalidUtf8,
}

/// Accumulates bytes into newline-terminated lines
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    buffer: Vec<u8, MAX_LINE_LEN>,
    overflowed: bool,
}

impl LineBuffer {
    /// Create an empty line buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard any partial line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(line))` when `byte` completes a line, `Ok(None)` when
    /// more bytes are needed, or `Err` when the completed line was dropped.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Line>, LineError> {
        if byte != b'\n' {
            if !self.overflowed && self.buffer.push(byte).is_err() {
                self.overflowed = true;
            }
            return Ok(None);
        }

        if self.overflowed {
            self.reset();
            return Err(LineError::TooLong);
        }

        let result = core::str::from_utf8(&self.buffer)
            .map_err(|_| LineError::InvalidUtf8)
            .and_then(|text| {
                let mut line = Line::new();
                line.push_str(text).map_err(|_| LineError::TooLong)?;
                Ok(Some(line))
            });
        self.reset();
        result
    }
}
