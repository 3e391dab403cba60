//! Millisecond tick helpers.
//!
//! Ticks are free-running `u32` milliseconds that wrap; every timeout in the
//! crate is a polled `elapsed > threshold` check against a stored tick.

/// Milliseconds from `since` to `now`, correct across a counter wrap.
pub fn timer_elapsed(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Current tick from the embassy time driver.
#[cfg(feature = "embedded")]
pub fn now_ms() -> u32 {
    embassy_time::Instant::now().as_millis() as u32
}
