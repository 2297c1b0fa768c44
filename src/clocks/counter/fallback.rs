use std::time::Instant;

use once_cell::sync::Lazy;

use crate::clocks::CycleCounter;

static ANCHOR: Lazy<Instant> = Lazy::new(Instant::now);

/// Stand-in counter for targets without a readable cycle counter.
///
/// Ticks are nanoseconds of the platform monotonic clock since the first read in this process, so
/// calibration converges on a rate of roughly one tick per nanosecond.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tsc;

impl CycleCounter for Tsc {
    fn read_counter(&self) -> u64 {
        // Offset by one so that the very first reading is never zero.
        ANCHOR.elapsed().as_nanos() as u64 + 1
    }
}
