use std::time::Duration;

use crate::Error;

/// Settings for a calibration run.
///
/// The defaults take roughly `rate_samples * rate_window` (about 220ms) of wall time to
/// calibrate.
///
/// ```
/// use std::time::Duration;
/// use tickcal::Config;
///
/// let config = Config::default()
///     .rate_samples(5)
///     .rate_window(Duration::from_millis(10));
/// assert_eq!(config.get_rate_samples(), 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    cost_samples: usize,
    rate_samples: usize,
    rate_window: Duration,
    max_stalled_reads: Option<u64>,
}

impl Config {
    /// Default number of samples taken when measuring the cost of reading the counter and the
    /// reference clock.
    pub const DEFAULT_COST_SAMPLES: usize = 101;

    /// Default number of tick rate estimates.
    pub const DEFAULT_RATE_SAMPLES: usize = 11;

    /// Default wall time spanned by each tick rate estimate.
    pub const DEFAULT_RATE_WINDOW: Duration = Duration::from_millis(20);

    /// Default limit on consecutive reference clock reads that fail to advance.
    pub const DEFAULT_MAX_STALLED_READS: u64 = 10_000_000;

    /// Creates a new [`Config`] with the default settings.
    pub fn new() -> Config {
        Config {
            cost_samples: Self::DEFAULT_COST_SAMPLES,
            rate_samples: Self::DEFAULT_RATE_SAMPLES,
            rate_window: Self::DEFAULT_RATE_WINDOW,
            max_stalled_reads: Some(Self::DEFAULT_MAX_STALLED_READS),
        }
    }

    /// Sets the number of samples used to measure read overheads.
    ///
    /// Must be odd, so that the median is a single sample.
    pub fn cost_samples(mut self, samples: usize) -> Config {
        self.cost_samples = samples;
        self
    }

    /// Sets the number of tick rate estimates.
    ///
    /// Must be odd, so that the median is a single sample.
    pub fn rate_samples(mut self, samples: usize) -> Config {
        self.rate_samples = samples;
        self
    }

    /// Sets the wall time each tick rate estimate spins for.
    pub fn rate_window(mut self, window: Duration) -> Config {
        self.rate_window = window;
        self
    }

    /// Sets how many consecutive reference clock reads may fail to advance before calibration
    /// gives up with [`Error::ReferenceClockStalled`].
    ///
    /// `None` waits for the clock indefinitely.
    pub fn max_stalled_reads(mut self, limit: Option<u64>) -> Config {
        self.max_stalled_reads = limit;
        self
    }

    pub fn get_cost_samples(&self) -> usize {
        self.cost_samples
    }

    pub fn get_rate_samples(&self) -> usize {
        self.rate_samples
    }

    pub fn get_rate_window(&self) -> Duration {
        self.rate_window
    }

    pub fn get_max_stalled_reads(&self) -> Option<u64> {
        self.max_stalled_reads
    }

    /// Checks that the sample counts are odd and non-zero and that the rate window is non-empty.
    pub fn validate(&self) -> Result<(), Error> {
        check_sample_count("cost_samples", self.cost_samples)?;
        check_sample_count("rate_samples", self.rate_samples)?;

        if self.rate_window.is_zero() {
            return Err(Error::EmptyWindow);
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn check_sample_count(name: &'static str, count: usize) -> Result<(), Error> {
    if count % 2 == 0 {
        return Err(Error::InvalidSampleCount { name, count });
    }

    Ok(())
}
