//! Mock adapters for integration tests.
//!
//! The clock and the delay share one millisecond counter, so a blocking
//! driver loop advances simulated time exactly as far as it sleeps. The
//! range source replays a scripted trace of distances and faults.

use std::cell::Cell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use stepaware_range::SensorError;
use stepaware_range::app::events::PerceptionEvent;
use stepaware_range::app::ports::{ClockPort, EventSink, RangePort};

// ── Scripted range source ─────────────────────────────────────

/// One scripted poll result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    Distance(u32),
    Fault(SensorError),
}

impl From<u32> for Reading {
    fn from(mm: u32) -> Self {
        Self::Distance(mm)
    }
}

/// Replays a fixed trace of readings through [`RangePort`].
pub struct ScriptedRange {
    script: Vec<Reading>,
    cursor: usize,
    repeat: bool,
    faults: u32,
}

#[allow(dead_code)]
impl ScriptedRange {
    /// Play `script` once; further polls report [`SensorError::NoEcho`].
    pub fn once(script: impl IntoIterator<Item = impl Into<Reading>>) -> Self {
        Self {
            script: script.into_iter().map(Into::into).collect(),
            cursor: 0,
            repeat: false,
            faults: 0,
        }
    }

    /// Play `script` in a loop.
    pub fn looping(script: impl IntoIterator<Item = impl Into<Reading>>) -> Self {
        Self {
            repeat: true,
            ..Self::once(script)
        }
    }

    /// Polls served so far.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        !self.repeat && self.cursor >= self.script.len()
    }

    /// Failed polls served so far.
    pub fn faults(&self) -> u32 {
        self.faults
    }
}

impl RangePort for ScriptedRange {
    fn poll_raw_distance(&mut self) -> Result<u32, SensorError> {
        let step = if self.script.is_empty() {
            None
        } else if self.repeat {
            Some(self.script[self.cursor % self.script.len()])
        } else {
            self.script.get(self.cursor).copied()
        };
        self.cursor += 1;

        match step {
            Some(Reading::Distance(mm)) => Ok(mm),
            Some(Reading::Fault(e)) => {
                self.faults = self.faults.saturating_add(1);
                Err(e)
            }
            None => {
                self.faults = self.faults.saturating_add(1);
                Err(SensorError::NoEcho)
            }
        }
    }
}

// ── Simulated time ────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct SimClock {
    now: Rc<Cell<u32>>,
}

#[allow(dead_code)]
impl SimClock {
    pub fn starting_at(ms: u32) -> Self {
        Self {
            now: Rc::new(Cell::new(ms)),
        }
    }

    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }

    /// A delay that moves this clock forward.
    pub fn delay(&self) -> SimDelay {
        SimDelay {
            clock: self.clone(),
            slept_ns: 0,
        }
    }
}

impl ClockPort for SimClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

pub struct SimDelay {
    clock: SimClock,
    pub slept_ns: u64,
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.slept_ns += u64::from(ns);
        self.clock.advance(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.slept_ns += u64::from(ms) * 1_000_000;
        self.clock.advance(ms);
    }
}

// ── Event recorder ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<PerceptionEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn crossings(&self) -> Vec<&PerceptionEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, PerceptionEvent::ThresholdCrossed { .. }))
            .collect()
    }

    pub fn clears(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PerceptionEvent::Cleared { .. }))
            .count()
    }

    pub fn position(&self, pred: impl Fn(&PerceptionEvent) -> bool) -> Option<usize> {
        self.events.iter().position(pred)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &PerceptionEvent) {
        self.events.push(event.clone());
    }
}
