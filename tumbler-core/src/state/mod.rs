//! Display state persisted across restarts

pub mod record;

pub use record::{RecordError, StateRecord, WheelState, MAX_RECORD_LEN};
