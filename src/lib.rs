//! Calibrated cycle-counter timing.
//!
//! tickcal turns the processor's cycle counter into nanosecond measurements, for instrumentation
//! where reading the operating system's clock is too slow or too jittery.
//!
//! # Design
//!
//! Two clocks are involved: a source and a reference.  The source is a cycle counter that is
//! cheap to read but ticks in units that are not nanoseconds.  The reference is the operating
//! system's wall clock, which is expensive to read but is denominated in nanoseconds.
//!
//! Calibration happens once, up front, and measures three constants:
//! - the cost of reading the counter, in ticks
//! - the cost of reading the reference clock, in ticks
//! - the tick rate, in ticks per nanosecond, by comparing the counter against the reference clock
//!   over several short windows
//!
//! Each constant is the median of a set of samples, so that readings disturbed by interrupts or
//! scheduling do not skew the result.  Once calibrated, taking a measurement is a single counter
//! read, and the reference clock is never consulted again.
//!
//! ```no_run
//! let counter = tickcal::global()?;
//!
//! let start = counter.now();
//! // ... the code being measured ...
//! let finish = counter.now();
//!
//! let nanos = counter.to_nanoseconds(counter.duration(start, finish));
//! println!("took {}ns", nanos);
//! # Ok::<(), tickcal::Error>(())
//! ```
//!
//! # Calibration cost
//!
//! With the default [`Config`], calibration spins for at least 220ms.  [`global`] runs it at most
//! once per process and hands out the same instance to every caller afterwards; [`calibrate`] runs
//! it every time it is called.
//!
//! # Counter support
//!
//! The counter is read directly from the processor on the following platforms:
//! - x86/x86_64 ([RDTSC])
//! - AArch64, except iOS (the `cntvct_el0` virtual counter)
//!
//! Other platforms fall back to the operating system's monotonic clock.
//!
//! Measurements are only meaningful on processors whose counter ticks at a constant rate
//! regardless of power state, and whose counters are synchronized across cores.  Most processors
//! from the last decade qualify ([source][tsc_support]); [`has_invariant_counter`] reports whether
//! the current one advertises it.
//!
//! [RDTSC]: https://www.felixcloutier.com/x86/rdtsc
//! [tsc_support]: http://oliveryang.net/2015/09/pitfalls-of-TSC-usage/
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

mod calibration;
use self::calibration::Calibration;
mod clocks;
pub use self::clocks::{CycleCounter, ReferenceClock, SystemClock, Tsc};
mod config;
pub use self::config::Config;
mod counter;
pub use self::counter::{CalibratedCounter, TickDuration, Timepoint};
mod detection;
pub use self::detection::has_invariant_counter;
mod error;
pub use self::error::{Error, Stage};
mod mock;
pub use self::mock::{IntoNanoseconds, Mock, MockClock, MockCounter};
mod stats;

static GLOBAL_COUNTER: OnceCell<CalibratedCounter> = OnceCell::new();

/// Calibrates the processor's cycle counter against the operating system's wall clock.
///
/// Blocks for the duration of calibration: at least `rate_samples * rate_window`.
///
/// # Errors
///
/// If the configuration is invalid, the wall clock stops advancing for longer than the
/// configured limit, or the counter does not appear to advance, an error variant will be returned
/// describing the failure.
pub fn calibrate(config: &Config) -> Result<CalibratedCounter, Error> {
    if !has_invariant_counter() {
        warn!("processor does not advertise an invariant cycle counter; measurements may drift");
    }

    calibrate_with(Tsc, SystemClock::default(), config)
}

/// Calibrates the given counter against the given reference clock.
///
/// # Errors
///
/// See [`calibrate`].
pub fn calibrate_with<C, R>(
    counter: C,
    clock: R,
    config: &Config,
) -> Result<CalibratedCounter<C>, Error>
where
    C: CycleCounter,
    R: ReferenceClock,
{
    let calibration = Calibration::calibrate(&counter, &clock, config)?;
    debug!(
        counter_read_cost = calibration.counter_read_cost,
        clock_read_cost = calibration.clock_read_cost,
        tick_rate = calibration.tick_rate,
        "calibrated cycle counter"
    );

    Ok(CalibratedCounter::new(counter, calibration))
}

/// Gets the process-wide calibrated counter, calibrating it with the default [`Config`] on first
/// use.
///
/// If several threads call this at the same time, only one of them calibrates while the others
/// wait for it, and all of them get the same instance.
///
/// # Errors
///
/// If calibration fails, the error is returned and the next call tries again.
pub fn global() -> Result<&'static CalibratedCounter, Error> {
    init_global(&Config::default())
}

/// Gets the process-wide calibrated counter, calibrating it with `config` if it has not been
/// calibrated yet.
///
/// If the counter was already calibrated, `config` is ignored and the existing instance is
/// returned.
///
/// # Errors
///
/// See [`global`].
pub fn init_global(config: &Config) -> Result<&'static CalibratedCounter, Error> {
    GLOBAL_COUNTER.get_or_try_init(|| calibrate(config))
}

#[cfg(test)]
mod tests {
    use super::{calibrate, global, init_global, Config};
    use average::{Mean, Min};
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn test_calibrated_constants() {
        let counter = global().unwrap();
        assert!(counter.tick_rate() > 0.0);
        assert!(counter.tick_rate().is_finite());
        assert!(counter.now() > 0);
    }

    #[test]
    fn test_global_is_shared() {
        let handles = (0..8)
            .map(|_| thread::spawn(|| global().unwrap() as *const _ as usize))
            .collect::<Vec<_>>();

        let addrs = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>();
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));

        // Later calls ignore the configuration and hand back the existing instance.
        let config = Config::default().rate_samples(1);
        let counter = init_global(&config).unwrap();
        assert_eq!(counter as *const _ as usize, addrs[0]);

        let first = global().unwrap();
        assert_eq!(first.counter_read_cost(), counter.counter_read_cost());
        assert_eq!(first.clock_read_cost(), counter.clock_read_cost());
        assert_eq!(first.tick_rate(), counter.tick_rate());
    }

    #[test]
    #[cfg_attr(not(feature = "flaky_tests"), ignore)]
    fn test_sequential_reads_are_ordered() {
        let counter = global().unwrap();
        for _ in 0..1_000 {
            // Back-to-back reads may come in under the median read cost.
            let start = counter.start();
            let finish = counter.end();
            assert!(counter.duration(start, finish) >= -(counter.counter_read_cost() as i64));

            let a = counter.now();
            let b = counter.now();
            assert!(b >= a);
        }
    }

    #[test]
    #[cfg_attr(not(feature = "flaky_tests"), ignore)]
    fn test_duration_across_work_is_non_negative() {
        let counter = global().unwrap();
        for _ in 0..1_000 {
            let a = counter.now();
            let mut acc = 0u64;
            for i in 0..1_000u64 {
                acc = std::hint::black_box(acc.wrapping_add(i));
            }
            let b = counter.now();
            assert!(
                counter.duration(a, b) >= 0,
                "duration {} across {} of work",
                counter.duration(a, b),
                acc
            );
        }
    }

    #[test]
    #[cfg_attr(not(feature = "flaky_tests"), ignore)]
    fn test_sleep_50ms() {
        let counter = global().unwrap();

        let t0 = counter.now();
        thread::sleep(Duration::from_millis(50));
        let t1 = counter.now();

        let nanos = counter.to_nanoseconds(counter.duration(t0, t1));
        assert!(
            (45_000_000..=60_000_000).contains(&nanos),
            "expected roughly 50ms, measured {}ns",
            nanos
        );
    }

    #[test]
    #[cfg_attr(not(feature = "flaky_tests"), ignore)]
    fn test_sleep_100ms() {
        let counter = global().unwrap();

        let t0 = counter.now();
        thread::sleep(Duration::from_millis(100));
        let elapsed = counter.elapsed(t0);

        assert!(
            elapsed >= Duration::from_millis(97) && elapsed <= Duration::from_millis(115),
            "expected roughly 100ms, measured {:?}",
            elapsed
        );
    }

    #[test]
    #[cfg_attr(not(feature = "flaky_tests"), ignore)]
    fn test_back_to_back_reads_match_read_cost() {
        let counter = global().unwrap();
        let deltas = (0..10_000)
            .map(|_| {
                let a = counter.now();
                let b = counter.now();
                b.wrapping_sub(a) as f64
            })
            .collect::<Vec<_>>();

        let cost = counter.counter_read_cost() as f64;
        let min: Min = deltas.iter().copied().collect();
        let mean: Mean = deltas.iter().copied().collect();

        assert!(min.min() <= cost, "min {} above read cost {}", min.min(), cost);
        // Interrupts inflate the mean, but not by orders of magnitude over ten thousand reads.
        assert!(
            mean.mean() < cost * 10.0 + 100.0,
            "mean {} too far from read cost {}",
            mean.mean(),
            cost
        );
    }

    #[test]
    #[cfg_attr(not(feature = "flaky_tests"), ignore)]
    fn test_calibration_time_and_stability() {
        let config = Config::default();

        let started = Instant::now();
        let first = calibrate(&config).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(200));

        let second = calibrate(&config).unwrap();
        let drift = (first.tick_rate() - second.tick_rate()).abs() / first.tick_rate();
        assert!(
            drift < 0.05,
            "tick rate moved from {} to {} between calibrations",
            first.tick_rate(),
            second.tick_rate()
        );
    }
}
