//! Tumbler Serial Command Protocol
//!
//! This crate defines the text protocol spoken over the display's serial
//! line. It has no knowledge of motors or storage: it turns bytes into
//! commands and replies into text.
//!
//! # Protocol Overview
//!
//! The line has two modes. In NORMAL mode input is newline-terminated
//! commands:
//! ```text
//! SHOW <int>              roll the wheels to <int> mod 1000
//! SHOWF <float> <int>     show round(<float> * 10^<int>)
//! COUNTDOWN <int>         count down to zero, one step per second
//! INFO                    report displayed digits and coil phases
//! SAVE                    persist the display state
//! SET <int>               declare what the wheels show, without moving
//! CONFIGURE               enter calibration mode
//! ```
//!
//! In calibration (CONFIGURE) mode every byte is a key: `1`..`6` nudge one
//! motor a single half-step and `s` commits the calibration.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod jog;
pub mod line;
pub mod reply;

pub use command::{Command, CommandError};
pub use jog::{Axis, JogKey};
pub use line::{Line, LineBuffer, LineError, MAX_LINE_LEN};
pub use reply::{Reply, Status, MAX_REPLY_LEN};
