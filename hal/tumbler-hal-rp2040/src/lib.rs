//! RP2040-specific HAL for the cylinder display firmware
//!
//! This crate provides RP2040 implementations of the shared `tumbler-hal`
//! traits, plus board plumbing the firmware needs at startup:
//!
//! - GPIO allocation by number, for config-driven coil wiring
//! - Flash storage driver (implements `tumbler_hal::FlashStorage`)

#![no_std]

pub mod flash;
pub mod pins;

pub use tumbler_hal::StorageKey;
