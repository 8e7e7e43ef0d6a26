//! Port traits: the boundary between the perception core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ PerceptionService (domain)
//! ```
//!
//! Each physical sensor adapter implements [`RangePort`] and is lent to the
//! service by reference on every tick; the core never owns or inherits from
//! a driver.

use crate::error::SensorError;

// ───────────────────────────────────────────────────────────────
// Range port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side capability of a distance sensor.
pub trait RangePort {
    /// Take one distance measurement in millimetres.
    ///
    /// `Ok(0)` and any `Err` both mean "no valid reading this cycle". The
    /// adapter is responsible for its own fault-rate bookkeeping.
    fn poll_raw_distance(&mut self) -> Result<u32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock. Wraps at `u32::MAX`; callers use
/// wrapping arithmetic.
pub trait ClockPort {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → actuator / logging)
// ───────────────────────────────────────────────────────────────

/// The service emits [`PerceptionEvent`](super::events::PerceptionEvent)s
/// through this port. Adapters decide where they go (warning layer, serial
/// log, telemetry).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::PerceptionEvent);
}
