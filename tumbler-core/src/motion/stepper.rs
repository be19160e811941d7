//! Half-step driver for a 4-phase unipolar stepper
//!
//! The motor is driven directly from four output lines (through a ULN2003
//! style darlington array on the reference board). One half-step advances
//! the excitation pattern by one row of [`HALF_STEP_SEQUENCE`].

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

use crate::config::MotorConfig;

/// Coil excitation per phase, lines A..D
pub const HALF_STEP_SEQUENCE: [[bool; 4]; 8] = [
    [true, false, false, false],
    [true, true, false, false],
    [false, true, false, false],
    [false, true, true, false],
    [false, false, true, false],
    [false, false, true, true],
    [false, false, false, true],
    [true, false, false, true],
];

/// Number of phases in the half-step cycle
pub const PHASE_COUNT: u8 = HALF_STEP_SEQUENCE.len() as u8;

/// Shaft rotation per half-step, in hundredths of a degree
pub const STEP_ANGLE_CENTIDEGREES: i32 = 375;

/// Step delay used when nothing else is configured
pub const DEFAULT_DELAY_MS: u32 = 8;

/// A stepper motor driven in half-steps
///
/// `phase` always indexes [`HALF_STEP_SEQUENCE`]. It is only changed by
/// [`step`](Self::step) and by restoring persisted state, so after a
/// restart the coils can be energized exactly where they were left.
pub struct StepperMotor<P, D> {
    pins: [P; 4],
    delay: D,
    phase: u8,
    delay_ms: u32,
}

impl<P: OutputPin, D: DelayNs> StepperMotor<P, D> {
    /// Create a motor at phase 0 with the default step delay
    ///
    /// The lines are not driven until the first step.
    pub fn new(pins: [P; 4], delay: D) -> Self {
        Self {
            pins,
            delay,
            phase: 0,
            delay_ms: DEFAULT_DELAY_MS,
        }
    }

    /// Create a motor using the step delay from a board config
    pub fn from_config(pins: [P; 4], delay: D, config: &MotorConfig) -> Self {
        let mut motor = Self::new(pins, delay);
        motor.delay_ms = config.delay_ms;
        motor
    }

    /// Current phase index
    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Pause after each step, in milliseconds
    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// Overwrite the phase index without touching the lines
    pub fn restore_phase(&mut self, phase: u8) {
        self.phase = phase % PHASE_COUNT;
    }

    /// Derive the step delay from a speed setting
    ///
    /// `delay_ms = speed * 1000 / 375`, rounded down.
    pub fn set_speed(&mut self, speed: u32) {
        let delay = u64::from(speed) * 1000 / STEP_ANGLE_CENTIDEGREES as u64;
        self.delay_ms = u32::try_from(delay).unwrap_or(u32::MAX);
    }

    /// De-energize all four coils. The phase is kept.
    pub fn idle(&mut self) -> Result<(), P::Error> {
        for pin in self.pins.iter_mut() {
            pin.set_low()?;
        }
        Ok(())
    }

    /// Drive the lines to row `phase` of the sequence
    ///
    /// The stored phase index is left as is.
    pub fn set_phase(&mut self, phase: u8) -> Result<(), P::Error> {
        let row = HALF_STEP_SEQUENCE[(phase % PHASE_COUNT) as usize];
        for (pin, &high) in self.pins.iter_mut().zip(row.iter()) {
            if high {
                pin.set_high()?;
            } else {
                pin.set_low()?;
            }
        }
        Ok(())
    }

    /// Advance one half-step and energize the new phase
    pub fn step(&mut self, reverse: bool) -> Result<(), P::Error> {
        self.phase = if reverse {
            (self.phase + PHASE_COUNT - 1) % PHASE_COUNT
        } else {
            (self.phase + 1) % PHASE_COUNT
        };
        self.set_phase(self.phase)
    }

    /// Take `|steps|` half-steps, reverse when negative
    ///
    /// Suspends for the step delay after every step, including the last.
    pub async fn turn_steps(&mut self, steps: i32) -> Result<(), P::Error> {
        let reverse = steps < 0;
        for _ in 0..steps.unsigned_abs() {
            self.step(reverse)?;
            self.delay.delay_ms(self.delay_ms).await;
        }
        Ok(())
    }

    /// Rotate by an angle given in hundredths of a degree
    pub async fn turn_angle(&mut self, angle_centidegrees: i32) -> Result<(), P::Error> {
        self.turn_steps(angle_to_steps(angle_centidegrees)).await
    }
}

/// Half-steps for an angle in hundredths of a degree, rounded toward
/// negative infinity
pub fn angle_to_steps(angle_centidegrees: i32) -> i32 {
    angle_centidegrees.div_euclid(STEP_ANGLE_CENTIDEGREES)
}
