//! Board-agnostic core logic for the cylinder display
//!
//! This crate contains all display logic that does not depend on a specific
//! chip:
//!
//! - Half-step stepper driving and digit wheel positioning
//! - Three-wheel display coordination and state persistence
//! - The serial command console and its calibration mode
//! - Board configuration types
//!
//! Hardware comes in through `embedded-hal` output pins and delays, an
//! `embedded-io-async` command stream and the `tumbler-hal` flash trait.

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod console;
pub mod display;
pub mod motion;
pub mod state;

#[cfg(test)]
mod testing;

pub use console::{Console, ConsoleError, Mode};
pub use display::{Display, DisplayError};
pub use motion::{Cylinder, StepperMotor};
