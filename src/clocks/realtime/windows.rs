use std::mem;

use winapi::shared::minwindef::FILETIME;
use winapi::um::sysinfoapi;

use crate::clocks::ReferenceClock;

/// Offset between the Windows epoch (1601-01-01) and the Unix epoch, in 100ns intervals.
const EPOCH_OFFSET: u64 = 116_444_736_000_000_000;

/// The operating system's wall clock (`GetSystemTimePreciseAsFileTime`).
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock {
    _default: (),
}

impl ReferenceClock for SystemClock {
    fn now_nanos(&self) -> u64 {
        let intervals = unsafe {
            let mut ft: FILETIME = mem::zeroed();
            sysinfoapi::GetSystemTimePreciseAsFileTime(&mut ft);
            (u64::from(ft.dwHighDateTime) << 32) | u64::from(ft.dwLowDateTime)
        };

        intervals.saturating_sub(EPOCH_OFFSET) * 100
    }
}
