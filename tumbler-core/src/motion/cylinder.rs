//! A digit wheel on a stepper
//!
//! The wheel carries the digits 0-9 around its rim, 36 degrees apart, and is
//! geared 2.5:1 to the motor. Positive digit steps roll the wheel toward
//! higher digits, which turns the motor backwards.

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

use super::stepper::StepperMotor;

/// Digits on one wheel
pub const DIGITS: u8 = 10;

/// Wheel rotation between adjacent digits, in degrees
pub const DEGREES_PER_DIGIT: i32 = 36;

/// Motor turns per wheel turn, in tenths
pub const GEAR_RATIO_TENTHS: i32 = 25;

/// Signed digit steps for the shortest roll from `current` to `target`
///
/// Both inputs are digits in `0..10`. When both directions are equally far
/// (five digits) the wheel rolls forward.
pub fn digit_steps(current: u8, target: u8) -> i8 {
    let forward = (target + DIGITS - current) % DIGITS;
    let backward = (current + DIGITS - target) % DIGITS;
    if backward < forward {
        -(backward as i8)
    } else {
        forward as i8
    }
}

/// Motor angle in hundredths of a degree for a number of digit steps
pub fn motor_angle(digit_steps: i8) -> i32 {
    let wheel_degrees = i32::from(digit_steps) * DEGREES_PER_DIGIT;
    let motor_degrees = (wheel_degrees * GEAR_RATIO_TENTHS).div_euclid(10);
    -motor_degrees * 100
}

/// One digit wheel and the motor that turns it
pub struct Cylinder<P, D> {
    motor: StepperMotor<P, D>,
    digit: u8,
}

impl<P: OutputPin, D: DelayNs> Cylinder<P, D> {
    /// Create a wheel believed to show 0
    pub fn new(motor: StepperMotor<P, D>) -> Self {
        Self { motor, digit: 0 }
    }

    /// Digit currently facing the reader
    pub fn digit(&self) -> u8 {
        self.digit
    }

    /// Declare which digit is showing, without moving
    pub fn set_digit(&mut self, digit: u8) {
        self.digit = digit % DIGITS;
    }

    pub fn motor(&self) -> &StepperMotor<P, D> {
        &self.motor
    }

    pub fn motor_mut(&mut self) -> &mut StepperMotor<P, D> {
        &mut self.motor
    }

    /// Roll to `digit` along the shortest path
    ///
    /// The new digit is recorded before the motor starts moving, so a
    /// rotation cut short still leaves the wheel believed to be at its target.
    pub async fn show(&mut self, digit: u8) -> Result<(), P::Error> {
        let digit = digit % DIGITS;
        let steps = digit_steps(self.digit, digit);
        self.digit = digit;
        self.motor.turn_angle(motor_angle(steps)).await
    }

    /// De-energize the motor
    pub fn idle(&mut self) -> Result<(), P::Error> {
        self.motor.idle()
    }

    /// Declare the wheel to be at 0, without moving
    pub fn reset_state(&mut self) {
        self.digit = 0;
    }
}
