//! Board configuration
//!
//! `DISPLAY_CONFIG` is generated by build.rs from `display.toml`, which is
//! validated there; a bad file fails the build rather than the boot.

use tumbler_core::config::{DisplayConfig, MotorConfig, SerialConfig};

include!(concat!(env!("OUT_DIR"), "/display_config.rs"));
