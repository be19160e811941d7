//! Three-wheel display coordinator
//!
//! Splits numbers into digits, rolls the three wheels together and keeps
//! their physical state in flash so a restart resumes where the wheels
//! really are.
//!
//! Calibration only ever concerns the tens and units wheels: resetting and
//! idling leave the hundreds wheel alone, as the reference board has always
//! done.

use embassy_futures::join::join3;
use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use tumbler_hal::{FlashError, FlashStorage, StorageKey};
use tumbler_protocol::{Axis, Status};

use crate::motion::Cylinder;
use crate::state::{RecordError, StateRecord, WheelState, MAX_RECORD_LEN};

/// Pause between countdown numbers, in milliseconds
pub const COUNTDOWN_PAUSE_MS: u32 = 1000;

/// Display operation errors
///
/// `E` is the output pin error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError<E> {
    /// Driving a coil line failed
    Motor(E),
    /// Reading or writing flash failed
    Storage(FlashError),
    /// Stored record could not be decoded
    Record(RecordError),
    /// A scaled fractional value does not fit an integer
    OutOfRange,
}

impl<E> From<FlashError> for DisplayError<E> {
    fn from(e: FlashError) -> Self {
        DisplayError::Storage(e)
    }
}

impl<E> From<RecordError> for DisplayError<E> {
    fn from(e: RecordError) -> Self {
        DisplayError::Record(e)
    }
}

/// Split a number into hundreds, tens and units digits
///
/// Uses floored division, so negative numbers still give digits in 0-9
/// (-1 shows as 999).
pub fn digits(number: i64) -> [u8; 3] {
    [
        number.div_euclid(100).rem_euclid(10) as u8,
        number.div_euclid(10).rem_euclid(10) as u8,
        number.rem_euclid(10) as u8,
    ]
}

/// `value * 10^decimals` rounded half away from zero
///
/// Earlier display firmware truncated instead, so `SHOWF 2.5 0` showed 2
/// and `SHOWF -2.7 0` showed 998. Exact halves now round away from zero
/// (3 and -3), which also differs from round-half-to-even.
///
/// Returns `None` when the result is not finite or does not fit an `i64`.
pub fn scale(value: f64, decimals: i32) -> Option<i64> {
    let rounded = libm::round(value * libm::pow(10.0, decimals as f64));
    // 2^63 is exactly representable; anything at or past it overflows
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if rounded.is_finite() && rounded > -LIMIT && rounded < LIMIT {
        Some(rounded as i64)
    } else {
        None
    }
}

/// The three-digit cylinder display
pub struct Display<P, D, S> {
    hundreds: Cylinder<P, D>,
    tens: Cylinder<P, D>,
    units: Cylinder<P, D>,
    pause: D,
    storage: S,
}

impl<P, D, S> Display<P, D, S>
where
    P: OutputPin,
    D: DelayNs,
    S: FlashStorage,
{
    /// Assemble a display; all wheels start believed at 0
    pub fn new(
        hundreds: Cylinder<P, D>,
        tens: Cylinder<P, D>,
        units: Cylinder<P, D>,
        pause: D,
        storage: S,
    ) -> Self {
        Self {
            hundreds,
            tens,
            units,
            pause,
            storage,
        }
    }

    pub fn cylinder(&self, axis: Axis) -> &Cylinder<P, D> {
        match axis {
            Axis::Hundreds => &self.hundreds,
            Axis::Tens => &self.tens,
            Axis::Units => &self.units,
        }
    }

    fn cylinder_mut(&mut self, axis: Axis) -> &mut Cylinder<P, D> {
        match axis {
            Axis::Hundreds => &mut self.hundreds,
            Axis::Tens => &mut self.tens,
            Axis::Units => &mut self.units,
        }
    }

    /// Show `number` mod 1000, rolling all three wheels at once
    ///
    /// Returns after every wheel has stopped. If a wheel failed, the first
    /// failure (hundreds, tens, units order) is returned.
    pub async fn show(&mut self, number: i64) -> Result<(), DisplayError<P::Error>> {
        let [h, t, u] = digits(number);
        let (hundreds, tens, units) = join3(
            self.hundreds.show(h),
            self.tens.show(t),
            self.units.show(u),
        )
        .await;
        hundreds.and(tens).and(units).map_err(DisplayError::Motor)
    }

    /// Show `value * 10^decimals`, rounded
    pub async fn showf(&mut self, value: f64, decimals: i32) -> Result<(), DisplayError<P::Error>> {
        let number = scale(value, decimals).ok_or(DisplayError::OutOfRange)?;
        self.show(number).await
    }

    /// Count down from `from` to 0, holding each number for a second
    ///
    /// A negative start is shown once, without counting.
    pub async fn countdown(&mut self, from: i64) -> Result<(), DisplayError<P::Error>> {
        self.show(from).await?;
        self.pause.delay_ms(COUNTDOWN_PAUSE_MS).await;

        let mut number = from;
        while number > 0 {
            number -= 1;
            self.show(number).await?;
            self.pause.delay_ms(COUNTDOWN_PAUSE_MS).await;
        }
        Ok(())
    }

    /// Snapshot of digits and motor phases
    pub fn record(&self) -> StateRecord {
        let wheel = |c: &Cylinder<P, D>| WheelState {
            digit: c.digit(),
            phase: c.motor().phase(),
        };
        StateRecord {
            hundreds: wheel(&self.hundreds),
            tens: wheel(&self.tens),
            units: wheel(&self.units),
        }
    }

    /// Overwrite digits and phases without moving anything
    pub fn apply(&mut self, record: &StateRecord) {
        for (cylinder, wheel) in [
            (&mut self.hundreds, &record.hundreds),
            (&mut self.tens, &record.tens),
            (&mut self.units, &record.units),
        ] {
            cylinder.set_digit(wheel.digit);
            cylinder.motor_mut().restore_phase(wheel.phase);
        }
    }

    /// Digits and phases as reported by INFO
    pub fn snapshot(&self) -> Status {
        let record = self.record();
        Status {
            digits: [
                record.hundreds.digit,
                record.tens.digit,
                record.units.digit,
            ],
            phases: [
                record.hundreds.phase,
                record.tens.phase,
                record.units.phase,
            ],
        }
    }

    /// Restore digits and phases from flash
    ///
    /// On error nothing is changed.
    pub async fn load_state(&mut self) -> Result<StateRecord, DisplayError<P::Error>> {
        let mut buffer = [0u8; MAX_RECORD_LEN];
        let len = self
            .storage
            .read(StorageKey::DisplayState, &mut buffer)
            .await?;
        let record = StateRecord::decode(&buffer[..len])?;
        self.apply(&record);
        Ok(record)
    }

    /// Persist digits and phases to flash
    pub async fn save_state(&mut self) -> Result<(), DisplayError<P::Error>> {
        let text = self.record().encode();
        self.storage
            .write(StorageKey::DisplayState, text.as_bytes())
            .await?;
        Ok(())
    }

    /// Declare tens and units to be at 0 and persist
    ///
    /// The hundreds wheel keeps its digit.
    pub async fn reset_state(&mut self) -> Result<(), DisplayError<P::Error>> {
        self.tens.reset_state();
        self.units.reset_state();
        self.save_state().await
    }

    /// De-energize the tens and units motors
    pub fn idle(&mut self) -> Result<(), DisplayError<P::Error>> {
        self.tens.idle().map_err(DisplayError::Motor)?;
        self.units.idle().map_err(DisplayError::Motor)
    }

    /// Declare which number is showing (mod 1000), without moving
    pub fn set_digits(&mut self, number: i64) {
        let [h, t, u] = digits(number);
        self.hundreds.set_digit(h);
        self.tens.set_digit(t);
        self.units.set_digit(u);
    }

    /// Step one wheel's motor a single half-step
    ///
    /// The wheel's digit is not touched.
    pub fn jog(&mut self, axis: Axis, reverse: bool) -> Result<(), DisplayError<P::Error>> {
        self.cylinder_mut(axis)
            .motor_mut()
            .step(reverse)
            .map_err(DisplayError::Motor)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::motion::{Cylinder, StepperMotor};
    use crate::testing::{coil_pins, levels, FakeDelay, FakePin, MemoryFlash, Rig};
    use embassy_futures::block_on;
    use embedded_hal::digital::ErrorKind;
    use proptest::prelude::*;

    #[test]
    fn test_digits_positive() {
        assert_eq!(digits(274), [2, 7, 4]);
        assert_eq!(digits(5), [0, 0, 5]);
        assert_eq!(digits(1234), [2, 3, 4]);
    }

    #[test]
    fn test_digits_negative_floor() {
        assert_eq!(digits(-1), [9, 9, 9]);
        assert_eq!(digits(-274), [7, 2, 6]);
        assert_eq!(digits(i64::MIN), [1, 9, 2]);
    }

    #[test]
    fn test_scale_rounds_half_away_from_zero() {
        assert_eq!(scale(3.14159, 2), Some(314));
        assert_eq!(scale(2.5, 0), Some(3));
        assert_eq!(scale(-2.5, 0), Some(-3));
        assert_eq!(scale(0.996, 2), Some(100));
        assert_eq!(scale(12.0, -1), Some(1));
        assert_eq!(scale(1.0, 3), Some(1000));
    }

    #[test]
    fn test_scale_rejects_out_of_range() {
        assert_eq!(scale(f64::NAN, 0), None);
        assert_eq!(scale(f64::INFINITY, 0), None);
        assert_eq!(scale(1.0, 400), None);
        assert_eq!(scale(1e19, 0), None);
        assert_eq!(scale(1.0, -400), Some(0));
    }

    #[test]
    fn test_scale_keeps_values_next_to_half() {
        // Largest double below 0.5 must not round up
        assert_eq!(scale(0.49999999999999994, 0), Some(0));
        assert_eq!(scale(-0.49999999999999994, 0), Some(0));
    }

    #[test]
    fn test_scale_keeps_large_odd_integers() {
        // Above 2^52 adding 0.5 is not representable
        assert_eq!(scale(4503599627370497.0, 0), Some(4503599627370497));
        assert_eq!(scale(-4503599627370497.0, 0), Some(-4503599627370497));
    }

    #[test]
    fn test_show_zero_on_fresh_display_does_not_move() {
        let mut rig = Rig::new();
        block_on(rig.display.show(0)).unwrap();
        assert!(rig.clock.pauses().is_empty());
        for coils in &rig.coils {
            assert_eq!(levels(coils), [0, 0, 0, 0]);
        }
    }

    #[test]
    fn test_show_sets_all_digits() {
        let mut rig = Rig::new();
        block_on(rig.display.show(274)).unwrap();
        assert_eq!(rig.display.snapshot().digits, [2, 7, 4]);

        // 2, 3 and 4 digits of travel, 24 half-steps each
        assert_eq!(rig.clock.pauses().len(), (2 + 3 + 4) * 24);
    }

    #[test]
    fn test_show_reports_first_failure_after_all_wheels_finish() {
        let clock = FakeDelay::default();
        let (tens_pins, _) = coil_pins();
        let (units_pins, _) = coil_pins();
        let broken = [
            FakePin::broken(),
            FakePin::broken(),
            FakePin::broken(),
            FakePin::broken(),
        ];
        let mut display = Display::new(
            Cylinder::new(StepperMotor::new(broken, clock.clone())),
            Cylinder::new(StepperMotor::new(tens_pins, clock.clone())),
            Cylinder::new(StepperMotor::new(units_pins, clock.clone())),
            clock.clone(),
            MemoryFlash::default(),
        );

        let result = block_on(display.show(111));
        assert_eq!(result, Err(DisplayError::Motor(ErrorKind::Other)));
        // Tens and units still completed their roll
        assert_eq!(clock.pauses().len(), 2 * 24);
        assert_eq!(display.snapshot().digits, [1, 1, 1]);
    }

    #[test]
    fn test_showf() {
        let mut rig = Rig::new();
        block_on(rig.display.showf(3.14159, 2)).unwrap();
        assert_eq!(rig.display.snapshot().digits, [3, 1, 4]);

        assert_eq!(
            block_on(rig.display.showf(f64::NAN, 2)),
            Err(DisplayError::OutOfRange)
        );
        assert_eq!(rig.display.snapshot().digits, [3, 1, 4]);
    }

    #[test]
    fn test_countdown_holds_each_number() {
        let mut rig = Rig::new();
        block_on(rig.display.countdown(3)).unwrap();
        assert_eq!(rig.display.snapshot().digits, [0, 0, 0]);

        let holds = rig
            .clock
            .pauses()
            .iter()
            .filter(|&&ms| ms == COUNTDOWN_PAUSE_MS)
            .count();
        assert_eq!(holds, 4);
    }

    #[test]
    fn test_countdown_negative_shows_once() {
        let mut rig = Rig::new();
        block_on(rig.display.countdown(-2)).unwrap();
        assert_eq!(rig.display.snapshot().digits, [9, 9, 8]);
        let holds = rig
            .clock
            .pauses()
            .iter()
            .filter(|&&ms| ms == COUNTDOWN_PAUSE_MS)
            .count();
        assert_eq!(holds, 1);
    }

    #[test]
    fn test_save_writes_record_format() {
        let mut rig = Rig::new();
        block_on(rig.display.show(274)).unwrap();
        block_on(rig.display.save_state()).unwrap();

        let status = rig.display.snapshot();
        let [hp, tp, up] = status.phases;
        let expected = std::format!("2,{}, 7,{},4,{}", hp, tp, up);
        assert_eq!(rig.flash.record().as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn test_load_restores_digits_and_phases() {
        let mut rig = Rig::with_flash(MemoryFlash::with_record("2,3, 7,0,4,6"));
        block_on(rig.display.load_state()).unwrap();

        let status = rig.display.snapshot();
        assert_eq!(status.digits, [2, 7, 4]);
        assert_eq!(status.phases, [3, 0, 6]);
        // Restoring never drives the coils
        for coils in &rig.coils {
            assert_eq!(levels(coils), [0, 0, 0, 0]);
        }
    }

    #[test]
    fn test_load_failure_keeps_zero_state() {
        let mut rig = Rig::new();
        assert_eq!(
            block_on(rig.display.load_state()),
            Err(DisplayError::Storage(FlashError::NotFound))
        );

        let mut rig = Rig::with_flash(MemoryFlash::with_record("3,1, x,0,0,0"));
        assert_eq!(
            block_on(rig.display.load_state()),
            Err(DisplayError::Record(RecordError::InvalidNumber))
        );
        assert_eq!(rig.display.snapshot(), Status::default());
    }

    #[test]
    fn test_reset_state_spares_hundreds() {
        let mut rig = Rig::new();
        rig.display.set_digits(274);
        block_on(rig.display.reset_state()).unwrap();

        assert_eq!(rig.display.snapshot().digits, [2, 0, 0]);
        assert_eq!(rig.flash.record().as_deref(), Some("2,0, 0,0,0,0"));
    }

    #[test]
    fn test_idle_spares_hundreds() {
        let mut rig = Rig::new();
        for axis in [Axis::Hundreds, Axis::Tens, Axis::Units] {
            rig.display.jog(axis, false).unwrap();
        }
        rig.display.idle().unwrap();

        assert_eq!(levels(&rig.coils[0]), [1, 1, 0, 0]);
        assert_eq!(levels(&rig.coils[1]), [0, 0, 0, 0]);
        assert_eq!(levels(&rig.coils[2]), [0, 0, 0, 0]);
    }

    #[test]
    fn test_set_digits_does_not_move() {
        let mut rig = Rig::new();
        rig.display.set_digits(1274);
        assert_eq!(rig.display.snapshot().digits, [2, 7, 4]);
        assert_eq!(rig.display.snapshot().phases, [0, 0, 0]);
        assert!(rig.clock.pauses().is_empty());
    }

    #[test]
    fn test_jog_steps_motor_only() {
        let mut rig = Rig::new();
        rig.display.set_digits(5);
        rig.display.jog(Axis::Units, true).unwrap();

        assert_eq!(rig.display.cylinder(Axis::Units).digit(), 5);
        assert_eq!(rig.display.cylinder(Axis::Units).motor().phase(), 7);
        assert_eq!(levels(&rig.coils[2]), [1, 0, 0, 1]);
        assert!(rig.clock.pauses().is_empty());
    }

    proptest! {
        #[test]
        fn prop_persist_restore_roundtrip(number in 0i64..1000, jogs in proptest::collection::vec((0usize..3, any::<bool>()), 0..12)) {
            let mut rig = Rig::new();
            block_on(rig.display.show(number)).unwrap();
            for (axis, reverse) in jogs {
                let axis = [Axis::Hundreds, Axis::Tens, Axis::Units][axis];
                rig.display.jog(axis, reverse).unwrap();
            }
            block_on(rig.display.save_state()).unwrap();

            let mut restored = Rig::with_flash(rig.flash.clone());
            block_on(restored.display.load_state()).unwrap();
            assert_eq!(restored.display.snapshot(), rig.display.snapshot());
        }
    }
}
