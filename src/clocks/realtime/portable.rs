use std::time::{SystemTime, UNIX_EPOCH};

use crate::clocks::ReferenceClock;

/// The operating system's wall clock, via [`SystemTime`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock {
    _default: (),
}

impl ReferenceClock for SystemClock {
    fn now_nanos(&self) -> u64 {
        // A clock set before the epoch reads as zero, which calibration treats as a stall.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos() as u64)
    }
}
