#[cfg(target_arch = "x86")]
use core::arch::x86::{__rdtscp, _mm_lfence, _rdtsc};
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::{__rdtscp, _mm_lfence, _rdtsc};

use crate::clocks::CycleCounter;

/// The processor's time stamp counter.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tsc;

impl CycleCounter for Tsc {
    #[inline]
    fn read_counter(&self) -> u64 {
        unsafe { _rdtsc() }
    }

    #[inline]
    fn read_counter_start(&self) -> u64 {
        unsafe {
            _mm_lfence();
            let result = _rdtsc();
            _mm_lfence();
            result
        }
    }

    #[inline]
    fn read_counter_end(&self) -> u64 {
        let mut aux: u32 = 0;
        unsafe {
            let result = __rdtscp(&mut aux as *mut _);
            _mm_lfence();
            result
        }
    }
}
