use crate::clocks::{CycleCounter, ReferenceClock};
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

/// Type which can be converted into a nanosecond representation.
///
/// This allows users of [`Mock`] to advance the time both with raw integer values and the more
/// convenient [`Duration`] type.
pub trait IntoNanoseconds {
    fn into_nanos(self) -> u64;
}

impl IntoNanoseconds for u64 {
    fn into_nanos(self) -> u64 {
        self
    }
}

impl IntoNanoseconds for Duration {
    fn into_nanos(self) -> u64 {
        self.as_nanos() as u64
    }
}

#[derive(Debug)]
struct Machine {
    ticks: AtomicU64,
    ticks_per_ns: u64,
    counter_cost: u64,
    clock_cost: u64,
    stalled_reads: AtomicU64,
    clock_offset: AtomicU64,
    last_clock: AtomicU64,
}

/// Simulated machine for deterministic calibration in tests.
///
/// The machine has a single timeline measured in counter ticks.  Reading the counter advances it by
/// a fixed counter cost and reading the clock advances it by a fixed clock cost, so calibrating
/// against a [`Mock`] measures exactly those costs and a tick rate of `ticks_per_ns`.
///
/// ```
/// use tickcal::{calibrate_with, Config, Mock};
///
/// let mock = Mock::new(3, 10, 40);
/// let config = Config::default()
///     .rate_samples(1)
///     .rate_window(std::time::Duration::from_micros(100));
/// let counter = calibrate_with(mock.counter(), mock.clock(), &config).unwrap();
/// assert_eq!(counter.counter_read_cost(), 10);
/// ```
#[derive(Debug, Clone)]
pub struct Mock {
    machine: Arc<Machine>,
}

impl Mock {
    /// Creates a machine whose counter ticks `ticks_per_ns` times per nanosecond, where a counter
    /// read costs `counter_cost` ticks and a clock read costs `clock_cost` ticks.
    ///
    /// A `ticks_per_ns` of zero is treated as one.
    pub fn new(ticks_per_ns: u64, counter_cost: u64, clock_cost: u64) -> Self {
        Self {
            machine: Arc::new(Machine {
                ticks: AtomicU64::new(0),
                ticks_per_ns: ticks_per_ns.max(1),
                counter_cost,
                clock_cost,
                stalled_reads: AtomicU64::new(0),
                clock_offset: AtomicU64::new(0),
                last_clock: AtomicU64::new(0),
            }),
        }
    }

    /// Gets a counter reading this machine's timeline.
    pub fn counter(&self) -> MockCounter {
        MockCounter { mock: self.clone() }
    }

    /// Gets a reference clock reading this machine's timeline.
    pub fn clock(&self) -> MockClock {
        MockClock { mock: self.clone() }
    }

    /// Gets the current position of the timeline, in ticks.
    pub fn ticks(&self) -> u64 {
        self.machine.ticks.load(Ordering::Acquire)
    }

    /// Advances the timeline by the given amount of time.
    pub fn increment<N: IntoNanoseconds>(&self, amount: N) {
        let ticks = amount.into_nanos() * self.machine.ticks_per_ns;
        self.machine.ticks.fetch_add(ticks, Ordering::AcqRel);
    }

    /// Makes the next `reads` clock reads repeat the previous clock reading.
    pub fn stall_clock(&self, reads: u64) {
        self.machine.stalled_reads.fetch_add(reads, Ordering::AcqRel);
    }

    /// Steps the clock backwards by the given amount of time, for all subsequent reads.
    pub fn rewind_clock<N: IntoNanoseconds>(&self, amount: N) {
        self.machine
            .clock_offset
            .fetch_add(amount.into_nanos(), Ordering::AcqRel);
    }
}

/// Counter half of a [`Mock`] machine.
#[derive(Debug, Clone)]
pub struct MockCounter {
    mock: Mock,
}

impl CycleCounter for MockCounter {
    fn read_counter(&self) -> u64 {
        let machine = &self.mock.machine;
        machine
            .ticks
            .fetch_add(machine.counter_cost, Ordering::AcqRel)
            + machine.counter_cost
    }
}

/// Reference clock half of a [`Mock`] machine.
#[derive(Debug, Clone)]
pub struct MockClock {
    mock: Mock,
}

impl ReferenceClock for MockClock {
    fn now_nanos(&self) -> u64 {
        let machine = &self.mock.machine;
        let ticks = machine.ticks.fetch_add(machine.clock_cost, Ordering::AcqRel) + machine.clock_cost;

        let stalled = machine
            .stalled_reads
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok();
        if stalled {
            return machine.last_clock.load(Ordering::Acquire);
        }

        let nanos = (ticks / machine.ticks_per_ns)
            .saturating_sub(machine.clock_offset.load(Ordering::Acquire));
        machine.last_clock.store(nanos, Ordering::Release);
        nanos
    }
}
