pub(crate) mod counter;
pub(crate) mod realtime;

pub use self::counter::Tsc;
pub use self::realtime::SystemClock;

/// A cycle counter that can be read cheaply.
///
/// Readings are raw ticks: they are not guaranteed to be in nanoseconds, and successive readings
/// are only guaranteed to be non-decreasing when taken on the same core (or on hardware with an
/// invariant counter).
pub trait CycleCounter {
    /// Reads the current value of the counter.
    fn read_counter(&self) -> u64;

    /// Reads the counter, optimized for measuring the time before the start of a code section.
    ///
    /// Sources may provide a start-specific read that prevents instructions which logically come
    /// after the read from executing before it.  Defaults to [`read_counter`].
    ///
    /// [`read_counter`]: CycleCounter::read_counter
    fn read_counter_start(&self) -> u64 {
        self.read_counter()
    }

    /// Reads the counter, optimized for measuring the time after the end of a code section.
    ///
    /// Sources may provide an end-specific read that waits for instructions which logically come
    /// before the read to complete.  Defaults to [`read_counter`].
    ///
    /// [`read_counter`]: CycleCounter::read_counter
    fn read_counter_end(&self) -> u64 {
        self.read_counter()
    }
}

/// A reference wall clock, used only while calibrating.
///
/// Successive readings are not trusted to be strictly increasing: calibration tolerates a clock
/// that stalls or steps backwards.
pub trait ReferenceClock {
    /// Gets the current time, in nanoseconds.
    fn now_nanos(&self) -> u64;
}

impl<T: CycleCounter + ?Sized> CycleCounter for &T {
    fn read_counter(&self) -> u64 {
        (**self).read_counter()
    }

    fn read_counter_start(&self) -> u64 {
        (**self).read_counter_start()
    }

    fn read_counter_end(&self) -> u64 {
        (**self).read_counter_end()
    }
}

impl<T: ReferenceClock + ?Sized> ReferenceClock for &T {
    fn now_nanos(&self) -> u64 {
        (**self).now_nanos()
    }
}
