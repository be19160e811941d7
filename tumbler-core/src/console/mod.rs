//! Command console
//!
//! The console owns the display and is the only thing that talks to the
//! command stream. It is transport-agnostic: any `embedded-io-async`
//! reader and writer will do.

pub mod interpreter;
pub mod mode;

pub use interpreter::{Console, ConsoleError, Shutdown, JOG_PAUSE_MS};
pub use mode::{Event, Mode};
