//! Perception service: the hexagonal core.
//!
//! [`PerceptionService`] owns one [`RangeEngine`] and paces it: the range
//! port is polled at most once per configured sample interval, and every
//! state change the engine reports is turned into a [`PerceptionEvent`].
//!
//! ```text
//!  RangePort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                │   PerceptionService     │
//!  ClockPort ──▶ │  Wipe · Window · Dir ·  │
//!                │  Presence               │
//!                └────────────────────────┘
//! ```

use embedded_hal::delay::DelayNs;
use log::info;

use crate::config::PerceptionConfig;
use crate::sensors::{RangeEngine, SensorStatus};

use super::commands::PerceptionCommand;
use super::events::PerceptionEvent;
use super::ports::{ClockPort, EventSink, RangePort};
use crate::sensors::presence::MotionEvent;

pub struct PerceptionService {
    engine: RangeEngine,
    last_poll_ms: Option<u32>,
    poll_count: u64,
}

impl PerceptionService {
    pub fn new(config: PerceptionConfig) -> Self {
        Self {
            engine: RangeEngine::new(config),
            last_poll_ms: None,
            poll_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        let status = self.engine.status();
        sink.emit(&PerceptionEvent::Started(status));
        info!("PerceptionService started ({:?})", status);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Poll the range port if a full sample interval has elapsed since the
    /// previous poll. Returns `true` if a poll happened.
    pub fn tick(
        &mut self,
        range: &mut impl RangePort,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) -> bool {
        let now = clock.now_ms();
        if let Some(last) = self.last_poll_ms {
            if now.wrapping_sub(last) < self.engine.config().sample_interval_ms {
                return false;
            }
        }
        self.last_poll_ms = Some(now);
        self.poll_count += 1;

        let direction_before = self.engine.direction();
        let out = self.engine.poll(range, now);

        if let Some(wipe) = out.wipe {
            sink.emit(&PerceptionEvent::Wiped {
                from_mm: wipe.previous_mm,
                to_mm: wipe.value_mm,
            });
        }
        if let Some(to) = out.direction_change {
            sink.emit(&PerceptionEvent::DirectionChanged {
                from: direction_before,
                to,
            });
        }
        if let Some((from, to)) = out.phase_change {
            sink.emit(&PerceptionEvent::PhaseChanged { from, to });
        }
        match out.event {
            Some(MotionEvent::ThresholdCrossed) => sink.emit(&PerceptionEvent::ThresholdCrossed {
                distance_mm: out.filtered_mm,
                direction: self.engine.direction(),
                count: self.engine.event_count(),
                at_ms: now,
            }),
            Some(MotionEvent::Cleared) => sink.emit(&PerceptionEvent::Cleared {
                distance_mm: out.filtered_mm,
                at_ms: now,
            }),
            Some(MotionEvent::None) | None => {}
        }
        true
    }

    /// Blocking driver loop: run `cycles` ticks, sleeping one sample
    /// interval between them. Returns the number of polls performed.
    pub fn run_cycles(
        &mut self,
        range: &mut impl RangePort,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
        delay: &mut impl DelayNs,
        cycles: u32,
    ) -> u32 {
        let mut polled = 0;
        for _ in 0..cycles {
            if self.tick(range, clock, sink) {
                polled += 1;
            }
            delay.delay_ms(self.engine.config().sample_interval_ms);
        }
        polled
    }

    // ── Command handling ──────────────────────────────────────

    pub fn handle_command(&mut self, cmd: PerceptionCommand) {
        info!("Command: {:?}", cmd);
        match cmd {
            PerceptionCommand::SetWindowSize(size) => self.engine.set_sample_window_size(size),
            PerceptionCommand::SetDetectionThreshold(mm) => self.engine.set_detection_threshold(mm),
            PerceptionCommand::SetDistanceRange { min_mm, max_mm } => {
                self.engine.set_distance_range(min_mm, max_mm);
            }
            PerceptionCommand::SetDirectionSensitivity(mm) => {
                self.engine.set_direction_sensitivity(mm);
            }
            PerceptionCommand::SetTriggerMode(mode) => self.engine.set_trigger_mode(mode),
            PerceptionCommand::SetSampleInterval(ms) => self.engine.set_sample_interval(ms),
            PerceptionCommand::SetDirectionDetection(on) => self.engine.set_direction_detection(on),
            PerceptionCommand::SetDirectionStability(ms) => self.engine.set_direction_stability(ms),
            PerceptionCommand::Replace(config) => self.engine.apply_config(config),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn engine(&self) -> &RangeEngine {
        &self.engine
    }

    pub fn status(&self) -> SensorStatus {
        self.engine.status()
    }

    pub fn poll_count(&self) -> u64 {
        self.poll_count
    }
}
