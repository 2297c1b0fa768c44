use crate::clocks::ReferenceClock;

/// The operating system's wall clock (`CLOCK_REALTIME`).
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock {
    _default: (),
}

impl ReferenceClock for SystemClock {
    #[allow(clippy::cast_sign_loss)]
    fn now_nanos(&self) -> u64 {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        unsafe {
            libc::clock_gettime(libc::CLOCK_REALTIME, &mut ts);
        }

        // `time_t` is signed, but a wall clock set before the Unix epoch is not something we try
        // to support: such a reading wraps, and calibration treats it as a clock stepping around.
        ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64
    }
}
