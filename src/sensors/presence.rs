//! Dual-mode presence state machine.
//!
//! Fuses filtered distance, movement magnitude and confirmed direction into a
//! single trigger decision, and edge-detects that decision into events.
//!
//! ```text
//!            [3 raw readings closing, outside band, approach confirmed]
//!   NEUTRAL ─────────────────────────────────────────────────▶ GRADUAL_APPROACH
//!      │                                                             │
//!      │ [K consecutive raw readings in band]                        │
//!      ▼                                                             │
//!   SUDDEN_APPEARANCE                                                │
//!      │                                                             │
//!      └──[filtered above band and not approaching]──────────────────┴──▶ NEUTRAL
//!      └──[no qualifying event for PRESENCE_TIMEOUT_MS]──────────────┘
//! ```
//!
//! | Phase             | Trigger condition                            |
//! |-------------------|----------------------------------------------|
//! | Neutral           | in band AND movement AND direction matches   |
//! | GradualApproach   | in band AND movement AND direction matches   |
//! | SuddenAppearance  | in band AND direction matches                |
//!
//! With direction detection disabled the trigger reduces to "in band".

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use crate::config::{
    PRESENCE_BUFFER_SIZE, PRESENCE_TIMEOUT_MS, PerceptionConfig, SUDDEN_APPEARANCE_SAMPLES,
    TriggerMode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PresencePhase {
    #[default]
    Neutral,
    /// Object seen closing in while still outside the band.
    GradualApproach,
    /// Object appeared inside the band with no prior approach.
    SuddenAppearance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotionEvent {
    #[default]
    None,
    /// Rising edge of the trigger decision.
    ThresholdCrossed,
    /// Falling edge of the trigger decision.
    Cleared,
}

/// Per-poll inputs, gathered by the engine after filtering.
#[derive(Debug, Clone, Copy)]
pub struct PresenceInput {
    /// Raw reading, `None` when the poll produced no valid reading.
    pub raw_mm: Option<u32>,
    pub filtered_mm: u32,
    pub previous_filtered_mm: u32,
    pub window_filled: bool,
    pub window_spread_mm: u32,
    /// The window was re-seeded by a wipe on this poll.
    pub reseeded: bool,
    /// Confirmed direction.
    pub direction: Direction,
    /// Short-term raw buffer, oldest first.
    pub recent: Option<[u32; PRESENCE_BUFFER_SIZE]>,
    pub now_ms: u32,
}

/// What changed on one update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresenceUpdate {
    pub event: Option<MotionEvent>,
    pub phase_change: Option<(PresencePhase, PresencePhase)>,
}

/// Whether `direction` satisfies the configured trigger policy.
pub fn trigger_matches(mode: TriggerMode, direction: Direction) -> bool {
    match mode {
        TriggerMode::ApproachingOnly => direction == Direction::Approaching,
        TriggerMode::RecedingOnly => direction == Direction::Receding,
        TriggerMode::Both => matches!(direction, Direction::Approaching | Direction::Receding),
        TriggerMode::Any(_) => true,
    }
}

/// Movement predicate over consecutive filtered distances.
///
/// A change of at least the per-sample threshold counts when the window is
/// consistent; a change of 1.5x the threshold counts regardless. The step
/// caused by a wipe re-seed is not movement.
pub fn movement_detected(input: &PresenceInput, config: &PerceptionConfig) -> bool {
    if input.reseeded || !input.window_filled || input.previous_filtered_mm == 0 {
        return false;
    }
    let change = u64::from(input.filtered_mm.abs_diff(input.previous_filtered_mm));
    let threshold = u64::from(config.movement_threshold_mm());
    let consistent = input.window_spread_mm < config.consistency_spread_mm;
    (change >= threshold && consistent) || change * 2 >= threshold * 3
}

pub struct PresenceTracker {
    phase: PresencePhase,
    in_band_count: u8,
    last_motion_ms: u32,
    detected: bool,
    last_event: MotionEvent,
    event_count: u32,
    last_event_ms: u32,
}

impl Default for PresenceTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self {
            phase: PresencePhase::Neutral,
            in_band_count: 0,
            last_motion_ms: 0,
            detected: false,
            last_event: MotionEvent::None,
            event_count: 0,
            last_event_ms: 0,
        }
    }

    pub fn phase(&self) -> PresencePhase {
        self.phase
    }

    pub fn is_detected(&self) -> bool {
        self.detected
    }

    pub fn last_event(&self) -> MotionEvent {
        self.last_event
    }

    pub fn event_count(&self) -> u32 {
        self.event_count
    }

    pub fn last_event_ms(&self) -> u32 {
        self.last_event_ms
    }

    pub fn in_band_count(&self) -> u8 {
        self.in_band_count
    }

    /// Drop the active phase and the in-band streak. Event history and the
    /// current trigger level are kept so edges stay consistent.
    pub fn reset_phase(&mut self) {
        self.phase = PresencePhase::Neutral;
        self.in_band_count = 0;
    }

    pub fn update(&mut self, input: &PresenceInput, config: &PerceptionConfig) -> PresenceUpdate {
        let mut out = PresenceUpdate::default();
        let entering_from = self.phase;

        // ── In-band streak (saturates at K) ──────────────────────
        let reached_sudden = match input.raw_mm {
            Some(raw) if config.in_warning_band(raw) => {
                let before = self.in_band_count;
                self.in_band_count = (before + 1).min(SUDDEN_APPEARANCE_SAMPLES);
                before < SUDDEN_APPEARANCE_SAMPLES && self.in_band_count == SUDDEN_APPEARANCE_SAMPLES
            }
            _ => {
                self.in_band_count = 0;
                false
            }
        };

        let movement = movement_detected(input, config);

        // ── Phase exits ──────────────────────────────────────────
        let mut exited = false;
        if self.phase != PresencePhase::Neutral {
            if input.filtered_mm > config.detection_threshold_mm
                && input.direction != Direction::Approaching
            {
                info!("Presence: {:?} -> Neutral (left band)", self.phase);
                self.phase = PresencePhase::Neutral;
                exited = true;
            } else if input.now_ms.wrapping_sub(self.last_motion_ms) > PRESENCE_TIMEOUT_MS {
                info!(
                    "Presence: {:?} -> Neutral (no motion for {} ms)",
                    self.phase,
                    input.now_ms.wrapping_sub(self.last_motion_ms)
                );
                self.phase = PresencePhase::Neutral;
                exited = true;
            }
        }

        // ── Phase entries ────────────────────────────────────────
        if self.phase == PresencePhase::Neutral && !exited {
            if reached_sudden {
                info!(
                    "Presence: Neutral -> SuddenAppearance ({} readings in band)",
                    SUDDEN_APPEARANCE_SAMPLES
                );
                self.phase = PresencePhase::SuddenAppearance;
                self.last_motion_ms = input.now_ms;
            } else if let Some(recent) = input.recent {
                let closing = recent.windows(2).all(|pair| pair[1] < pair[0]);
                let newest = recent[PRESENCE_BUFFER_SIZE - 1];
                if closing
                    && newest > config.detection_threshold_mm
                    && input.direction == Direction::Approaching
                {
                    info!("Presence: Neutral -> GradualApproach ({:?} mm)", recent);
                    self.phase = PresencePhase::GradualApproach;
                    self.last_motion_ms = input.now_ms;
                }
            }
        }

        if movement && self.phase != PresencePhase::Neutral {
            self.last_motion_ms = input.now_ms;
        }

        if self.phase != entering_from {
            out.phase_change = Some((entering_from, self.phase));
        }

        // ── Trigger decision ─────────────────────────────────────
        let in_band = config.in_warning_band(input.filtered_mm);
        let detected = if config.direction_enabled {
            let matches = trigger_matches(config.direction_trigger_mode, input.direction);
            match self.phase {
                PresencePhase::SuddenAppearance => in_band && matches,
                PresencePhase::GradualApproach | PresencePhase::Neutral => {
                    in_band && movement && matches
                }
            }
        } else {
            in_band
        };
        debug!(
            "Presence check: phase={:?} in_band={} movement={} dir={:?} -> {}",
            self.phase, in_band, movement, input.direction, detected
        );

        // ── Edge detection ───────────────────────────────────────
        if detected && !self.detected {
            self.event_count = self.event_count.saturating_add(1);
            self.last_event_ms = input.now_ms;
            self.last_event = MotionEvent::ThresholdCrossed;
            self.last_motion_ms = input.now_ms;
            out.event = Some(MotionEvent::ThresholdCrossed);
            info!(
                "Motion detected at {} mm (event #{})",
                input.filtered_mm, self.event_count
            );
        } else if !detected && self.detected {
            self.last_event_ms = input.now_ms;
            self.last_event = MotionEvent::Cleared;
            out.event = Some(MotionEvent::Cleared);
            info!("Motion cleared at {} mm", input.filtered_mm);
        }
        self.detected = detected;

        out
    }
}
