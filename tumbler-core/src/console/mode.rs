//! Console mode state machine
//!
//! The console is either reading command lines or taking calibration keys.
//! Which one is a pure function of the current mode and the last input.

use tumbler_protocol::{Command, CommandError, JogKey};

/// Console input modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Newline-terminated commands
    #[default]
    Normal,
    /// Single-key calibration
    Configure,
}

/// A unit of console input
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// A command line parsed
    Command(Command),
    /// A command line whose arguments did not parse
    Rejected(CommandError),
    /// A calibration key
    Key(JogKey),
}

impl Mode {
    /// Process an event and return the next mode
    pub fn transition(self, event: &Event) -> Self {
        use Mode::*;

        match (self, event) {
            (Normal, Event::Command(Command::Configure)) => Configure,
            (Configure, Event::Key(JogKey::Commit)) => Normal,
            (mode, _) => mode,
        }
    }
}
