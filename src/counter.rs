use std::time::Duration;

use crate::calibration::Calibration;
use crate::clocks::{CycleCounter, Tsc};

/// A raw cycle counter reading.
///
/// Readings are only comparable when taken from the same counter, on the same core or on hardware
/// with an invariant counter.
pub type Timepoint = u64;

/// The overhead-corrected number of ticks between two [`Timepoint`]s.
pub type TickDuration = i64;

/// A cycle counter calibrated against the reference clock.
///
/// Holds the cost of reading the counter, the cost of reading the reference clock, and the rate at
/// which the counter ticks, all measured once by [`calibrate`] or [`calibrate_with`] and fixed from
/// then on.  Every method is a plain read of those constants, so a calibrated counter can be
/// copied and shared between threads freely.
///
/// [`calibrate`]: crate::calibrate
/// [`calibrate_with`]: crate::calibrate_with
#[derive(Clone, Copy, Debug)]
pub struct CalibratedCounter<C = Tsc> {
    counter: C,
    calibration: Calibration,
}

impl<C: CycleCounter> CalibratedCounter<C> {
    pub(crate) fn new(counter: C, calibration: Calibration) -> Self {
        CalibratedCounter {
            counter,
            calibration,
        }
    }

    /// Reads the current value of the counter.
    ///
    /// No overhead correction is applied: the value is only meaningful when passed to
    /// [`duration`][CalibratedCounter::duration] along with another reading.
    #[inline]
    pub fn now(&self) -> Timepoint {
        self.counter.read_counter()
    }

    /// Reads the counter, specific to starting a measurement.
    ///
    /// Provides the same functionality as [`now`], but tries to ensure that no CPU instructions
    /// which logically come after the read end up executing before it.
    ///
    /// [`now`]: CalibratedCounter::now
    #[inline]
    pub fn start(&self) -> Timepoint {
        self.counter.read_counter_start()
    }

    /// Reads the counter, specific to ending a measurement.
    ///
    /// Provides the same functionality as [`now`], but tries to ensure that all CPU instructions
    /// which logically come before the read have completed before it is taken.
    ///
    /// [`now`]: CalibratedCounter::now
    #[inline]
    pub fn end(&self) -> Timepoint {
        self.counter.read_counter_end()
    }

    /// Calculates the number of ticks between two readings, less the cost of reading the counter.
    ///
    /// `finish` must have been read after `start`, from this counter.  Otherwise the result is
    /// meaningless, and may be negative.
    #[inline]
    pub fn duration(&self, start: Timepoint, finish: Timepoint) -> TickDuration {
        finish
            .wrapping_sub(start)
            .wrapping_sub(self.calibration.counter_read_cost) as TickDuration
    }

    /// Converts a tick duration to nanoseconds, truncating towards zero.
    #[inline]
    pub fn to_nanoseconds(&self, duration: TickDuration) -> i64 {
        (duration as f64 / self.calibration.tick_rate) as i64
    }

    /// Converts a tick duration to a [`Duration`].
    ///
    /// Negative durations saturate to zero.
    pub fn to_duration(&self, duration: TickDuration) -> Duration {
        let nanos = self.to_nanoseconds(duration);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or_default())
    }

    /// Gets the amount of time elapsed since `start` was read.
    pub fn elapsed(&self, start: Timepoint) -> Duration {
        self.to_duration(self.duration(start, self.now()))
    }

    /// Gets the cost of reading the counter, in ticks.
    pub fn counter_read_cost(&self) -> u64 {
        self.calibration.counter_read_cost
    }

    /// Gets the cost of reading the reference clock, in ticks.
    pub fn clock_read_cost(&self) -> u64 {
        self.calibration.clock_read_cost
    }

    /// Gets the number of counter ticks per nanosecond.
    pub fn tick_rate(&self) -> f64 {
        self.calibration.tick_rate
    }

    /// Gets the underlying counter.
    pub fn counter(&self) -> &C {
        &self.counter
    }
}
