/// Whether the processor advertises a cycle counter that ticks at a constant rate across power
/// states and can be read with the fenced instructions [`Tsc`] relies on.
///
/// Calibration still runs when this returns `false`, but the measured tick rate may drift with
/// frequency scaling or differ between cores.
///
/// [`Tsc`]: crate::Tsc
#[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse2"))]
pub fn has_invariant_counter() -> bool {
    let cpuid = raw_cpuid::CpuId::new();
    let has_invariant_tsc = cpuid
        .get_advanced_power_mgmt_info()
        .map_or(false, |apm| apm.has_invariant_tsc());
    let has_rdtscp = cpuid
        .get_extended_processor_and_feature_identifiers()
        .map_or(false, |epf| epf.has_rdtscp());

    has_invariant_tsc && has_rdtscp
}

/// Whether the processor advertises a cycle counter that ticks at a constant rate.
#[cfg(all(target_arch = "aarch64", not(target_os = "ios")))]
pub fn has_invariant_counter() -> bool {
    // AArch64 implies ARMv8 or above, where the generic timer runs at a fixed frequency.
    true
}

/// Whether the processor advertises a cycle counter that ticks at a constant rate.
#[cfg(not(any(
    all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse2"),
    all(target_arch = "aarch64", not(target_os = "ios"))
)))]
pub fn has_invariant_counter() -> bool {
    false
}
