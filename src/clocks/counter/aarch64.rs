use core::arch::asm;

use crate::clocks::CycleCounter;

/// The ARMv8 virtual system counter (`cntvct_el0`).
#[derive(Clone, Copy, Debug, Default)]
pub struct Tsc;

impl CycleCounter for Tsc {
    #[inline]
    fn read_counter(&self) -> u64 {
        let count: u64;

        unsafe {
            asm!("mrs {}, cntvct_el0", out(reg) count, options(nomem, nostack));
        }

        count
    }

    #[inline]
    fn read_counter_start(&self) -> u64 {
        let count: u64;

        // `isb` keeps the counter read from being speculated ahead of earlier instructions.
        unsafe {
            asm!("isb", "mrs {}, cntvct_el0", out(reg) count, options(nostack));
        }

        count
    }
}
