//! Motion control
//!
//! Half-step sequencing for the steppers and the digit wheels built on them.

pub mod cylinder;
pub mod stepper;

pub use cylinder::{digit_steps, motor_angle, Cylinder};
pub use stepper::{angle_to_steps, StepperMotor, HALF_STEP_SEQUENCE, STEP_ANGLE_CENTIDEGREES};
