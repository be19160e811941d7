//! Replies written back to the operator
//!
//! Replies are plain text. Each one is sent followed by a newline; the
//! status block already ends in one, so it is followed by a blank line.

use core::fmt::{self, Write};
use heapless::String;

/// Longest formatted reply, including the trailing newline
pub const MAX_REPLY_LEN: usize = 96;

/// Digits and coil phases of the three wheels, hundreds first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    pub digits: [u8; 3],
    pub phases: [u8; 3],
}

/// A message for the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    /// A numeric argument could not be parsed
    NotANumber,
    /// Countdown is starting from N
    CountdownFrom(i64),
    /// INFO block
    Status(Status),
    /// SAVE finished
    Saved,
    /// Entered CONFIGURE mode
    ConfigureStarted,
    /// Calibration committed, back to NORMAL mode
    Configured,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::NotANumber => f.write_str("Value is not a number"),
            Reply::CountdownFrom(n) => write!(f, "Countdown from {}", n),
            Reply::Status(status) => {
                let [h, t, u] = status.digits;
                let [hp, tp, up] = status.phases;
                write!(
                    f,
                    "Display\n\tDisplayed number: {}{}{}\n\tMotor states: {}, {}, {}\n",
                    h, t, u, hp, tp, up
                )
            }
            Reply::Saved => f.write_str("State saved"),
            Reply::ConfigureStarted => f.write_str("CONFIGURATION started"),
            Reply::Configured => f.write_str("Display configuration success"),
        }
    }
}

impl Reply {
    /// Format the reply as it goes on the wire, newline included
    pub fn to_line(&self) -> String<MAX_REPLY_LEN> {
        let mut line = String::new();
        // Every variant fits MAX_REPLY_LEN, even the i64 extremes
        let _ = writeln!(line, "{}", self);
        line
    }
}
