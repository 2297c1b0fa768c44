#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
pub use self::windows::SystemClock;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use self::unix::SystemClock;

#[cfg(not(any(unix, target_os = "windows")))]
mod portable;
#[cfg(not(any(unix, target_os = "windows")))]
pub use self::portable::SystemClock;
