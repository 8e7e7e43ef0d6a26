//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing perception events to the `log`
//! facade (UART / USB-CDC in production). The warning layer implements the
//! same trait to drive the light/alarm patterns.

use log::{debug, info};

use crate::app::events::PerceptionEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`PerceptionEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink {
    emitted: u32,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events written so far.
    pub fn emitted(&self) -> u32 {
        self.emitted
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &PerceptionEvent) {
        self.emitted = self.emitted.saturating_add(1);
        match event {
            PerceptionEvent::Started(s) => {
                info!(
                    "START | filtered={}mm dir={:?} phase={:?} events={}",
                    s.filtered_mm, s.direction, s.phase, s.event_count
                );
            }
            PerceptionEvent::ThresholdCrossed { distance_mm, direction, count, at_ms } => {
                info!(
                    "EVENT | crossed at {}mm dir={:?} #{} t={}ms",
                    distance_mm, direction, count, at_ms
                );
            }
            PerceptionEvent::Cleared { distance_mm, at_ms } => {
                info!("EVENT | cleared at {}mm t={}ms", distance_mm, at_ms);
            }
            PerceptionEvent::DirectionChanged { from, to } => {
                info!("DIR   | {:?} -> {:?}", from, to);
            }
            PerceptionEvent::PhaseChanged { from, to } => {
                info!("PHASE | {:?} -> {:?}", from, to);
            }
            PerceptionEvent::Wiped { from_mm, to_mm } => {
                debug!("WIPE  | {}mm -> {}mm", from_mm, to_mm);
            }
        }
    }
}
