#[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse2"))]
mod x86;
#[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse2"))]
pub use self::x86::Tsc;

// The instruction needed to read the raw counter (`mrs`) is not available on iOS.
#[cfg(all(target_arch = "aarch64", not(target_os = "ios")))]
mod aarch64;
#[cfg(all(target_arch = "aarch64", not(target_os = "ios")))]
pub use self::aarch64::Tsc;

#[cfg(not(any(
    all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse2"),
    all(target_arch = "aarch64", not(target_os = "ios")),
)))]
mod fallback;
#[cfg(not(any(
    all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse2"),
    all(target_arch = "aarch64", not(target_os = "ios")),
)))]
pub use self::fallback::Tsc;
