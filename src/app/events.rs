//! Outbound perception events.
//!
//! The [`PerceptionService`](super::service::PerceptionService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. The warning layer
//! reacts to `ThresholdCrossed`/`Cleared`; the rest are diagnostic.

use crate::sensors::SensorStatus;
use crate::sensors::direction::Direction;
use crate::sensors::presence::PresencePhase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PerceptionEvent {
    /// The service has started (carries the initial status).
    Started(SensorStatus),

    /// Trigger decision rose: an object entered the warning band in a
    /// hazard-worthy way.
    ThresholdCrossed { distance_mm: u32, direction: Direction, count: u32, at_ms: u32 },

    /// Trigger decision fell.
    Cleared { distance_mm: u32, at_ms: u32 },

    /// The confirmed direction changed.
    DirectionChanged { from: Direction, to: Direction },

    /// The presence state machine changed phase.
    PhaseChanged { from: PresencePhase, to: PresencePhase },

    /// The filter was re-seeded from a raw reading.
    Wiped { from_mm: u32, to_mm: u32 },
}
