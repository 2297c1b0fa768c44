use crossbeam_utils::Backoff;
use tracing::{debug, trace};

use crate::clocks::{CycleCounter, ReferenceClock};
use crate::stats::median;
use crate::{Config, Error, Stage};

/// The constants measured by a calibration run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Calibration {
    pub counter_read_cost: u64,
    pub clock_read_cost: u64,
    pub tick_rate: f64,
}

impl Calibration {
    /// Measures the read costs and tick rate of `counter` against `clock`.
    ///
    /// The stages run in order, each relying on the constants measured by the ones before it:
    /// the counter read cost, then the clock read cost, then the tick rate.
    pub fn calibrate<C, R>(counter: &C, clock: &R, config: &Config) -> Result<Calibration, Error>
    where
        C: CycleCounter + ?Sized,
        R: ReferenceClock + ?Sized,
    {
        config.validate()?;

        let counter_read_cost = measure_counter_cost(counter, config.get_cost_samples());
        debug!(counter_read_cost, "measured counter read cost");

        let clock_read_cost = measure_clock_cost(counter, clock, config, counter_read_cost)?;
        debug!(clock_read_cost, "measured reference clock read cost");

        let tick_rate = measure_tick_rate(counter, clock, config, counter_read_cost, clock_read_cost)?;
        debug!(tick_rate, "measured tick rate");

        if !(tick_rate.is_finite() && tick_rate > 0.0) {
            return Err(Error::NonPositiveTickRate(tick_rate));
        }

        Ok(Calibration {
            counter_read_cost,
            clock_read_cost,
            tick_rate,
        })
    }
}

/// Tracks consecutive reference clock reads that failed to advance.
struct StallGuard {
    stage: Stage,
    limit: Option<u64>,
    consecutive: u64,
    total: u64,
}

impl StallGuard {
    fn new(stage: Stage, config: &Config) -> StallGuard {
        StallGuard {
            stage,
            limit: config.get_max_stalled_reads(),
            consecutive: 0,
            total: 0,
        }
    }

    fn stalled(&mut self) -> Result<(), Error> {
        self.consecutive += 1;
        self.total += 1;

        match self.limit {
            Some(limit) if self.consecutive > limit => Err(Error::ReferenceClockStalled {
                stage: self.stage,
                reads: self.consecutive,
            }),
            _ => Ok(()),
        }
    }

    fn advanced(&mut self) {
        self.consecutive = 0;
    }
}

fn measure_counter_cost<C>(counter: &C, samples: usize) -> u64
where
    C: CycleCounter + ?Sized,
{
    let mut costs = Vec::with_capacity(samples);
    let mut prev = counter.read_counter();

    while costs.len() < samples {
        let next = counter.read_counter();
        costs.push(next.wrapping_sub(prev));
        prev = next;
    }

    median(&mut costs).unwrap_or_default()
}

fn measure_clock_cost<C, R>(
    counter: &C,
    clock: &R,
    config: &Config,
    counter_read_cost: u64,
) -> Result<u64, Error>
where
    C: CycleCounter + ?Sized,
    R: ReferenceClock + ?Sized,
{
    let samples = config.get_cost_samples();
    let mut guard = StallGuard::new(Stage::ClockCost, config);
    let mut costs = Vec::with_capacity(samples);

    while costs.len() < samples {
        let start_time = clock.now_nanos();
        let start_ticks = counter.read_counter();
        let finish_time = clock.now_nanos();
        let finish_ticks = counter.read_counter();

        if finish_time <= start_time {
            trace!(start_time, finish_time, "reference clock did not advance, retrying");
            guard.stalled()?;
            continue;
        }
        guard.advanced();

        // Two counter reads bracket the clock read.
        let cost = finish_ticks
            .wrapping_sub(start_ticks)
            .saturating_sub(counter_read_cost * 2);
        costs.push(cost);
    }

    if guard.total > 0 {
        debug!(rejected = guard.total, "discarded non-advancing clock cost samples");
    }

    Ok(median(&mut costs).unwrap_or_default())
}

fn measure_tick_rate<C, R>(
    counter: &C,
    clock: &R,
    config: &Config,
    counter_read_cost: u64,
    clock_read_cost: u64,
) -> Result<f64, Error>
where
    C: CycleCounter + ?Sized,
    R: ReferenceClock + ?Sized,
{
    let samples = config.get_rate_samples();
    let window = config.get_rate_window().as_nanos() as u64;
    let mut guard = StallGuard::new(Stage::TickRate, config);
    let mut rates = Vec::with_capacity(samples);

    while rates.len() < samples {
        let start_time = clock.now_nanos();
        let start_ticks = counter.read_counter();

        let backoff = Backoff::new();
        let mut last_time = start_time;
        let elapsed = loop {
            let now = clock.now_nanos();

            if now <= last_time {
                trace!(now, last_time, "reference clock did not advance, polling again");
                guard.stalled()?;
            } else {
                guard.advanced();

                // A clock that stepped backwards has not elapsed anything until it passes the
                // start again.
                let elapsed = now.saturating_sub(start_time);
                if elapsed >= window {
                    break elapsed;
                }
            }

            last_time = now;
            backoff.spin();
        };
        let finish_ticks = counter.read_counter();

        let ticks = (finish_ticks.wrapping_sub(start_ticks) as i64)
            .wrapping_sub(counter_read_cost as i64)
            .wrapping_sub(clock_read_cost as i64);
        let rate = ticks as f64 / elapsed as f64;
        trace!(ticks, elapsed, rate, "tick rate sample");
        rates.push(rate);
    }

    if guard.total > 0 {
        debug!(stalled_polls = guard.total, "reference clock stalled while measuring tick rate");
    }

    Ok(median(&mut rates).unwrap_or_default())
}
