use std::fmt;

/// A step of the calibration protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Measuring the cost of reading the cycle counter.
    CounterCost,
    /// Measuring the cost of reading the reference clock.
    ClockCost,
    /// Measuring the number of counter ticks per nanosecond.
    TickRate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::CounterCost => write!(f, "counter read cost"),
            Stage::ClockCost => write!(f, "reference clock read cost"),
            Stage::TickRate => write!(f, "tick rate"),
        }
    }
}

/// Errors returned when calibrating a counter.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// A sample count was zero or even, so it has no single median sample.
    #[error("{name} must be odd and non-zero, got {count}")]
    InvalidSampleCount { name: &'static str, count: usize },
    /// The tick rate window was zero.
    #[error("rate window must be non-zero")]
    EmptyWindow,
    /// The reference clock did not advance for too many consecutive reads.
    #[error("reference clock did not advance after {reads} reads while measuring {stage}")]
    ReferenceClockStalled { stage: Stage, reads: u64 },
    /// The measured tick rate was not a finite positive number.
    #[error("measured tick rate {0} is not positive; is the counter advancing?")]
    NonPositiveTickRate(f64),
}
