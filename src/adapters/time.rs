//! Host time adapter.
//!
//! Provides the monotonic millisecond clock the perception service paces
//! itself with. On the device the board support code supplies a
//! [`ClockPort`] backed by the high-resolution system timer; on the host
//! this wraps `std::time::Instant` for simulation and replay.

use std::time::Instant;

use crate::app::ports::ClockPort;

/// Milliseconds since construction, truncated to `u32` (wraps after ~49 days).
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl ClockPort for MonotonicClock {
    fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}
