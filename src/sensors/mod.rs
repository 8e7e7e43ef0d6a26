//! Range perception engine and its four stages.
//!
//! [`RangeEngine`] owns every stage and runs them once per poll, leaves
//! first:
//!
//! ```text
//!  raw ──▶ WipeDetector ──▶ SampleWindow ──▶ DirectionClassifier ──▶ PresenceTracker
//!              │  (re-seed)      ▲                  ▲ (force + skip)
//!              └─────────────────┴──────────────────┘
//! ```
//!
//! The engine never fails. A range source error is folded into "no valid
//! reading" and handled by the window's hold-last-median policy.

pub mod direction;
pub mod presence;
pub mod wipe;
pub mod window;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::app::ports::RangePort;
use crate::config::{PerceptionConfig, TriggerMode};
use crate::diagnostics::{ChangeGate, RawHistory};
use crate::error::{self, Error};
use direction::{Direction, DirectionClassifier};
use presence::{MotionEvent, PresenceInput, PresencePhase, PresenceTracker};
use window::SampleWindow;
use wipe::{Wipe, WipeDetector};

/// Point-in-time view of the engine's outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SensorStatus {
    /// Median-filtered distance (mm), 0 when no estimate exists.
    pub filtered_mm: u32,
    /// Confirmed direction.
    pub direction: Direction,
    pub object_detected: bool,
    pub phase: PresencePhase,
    pub last_event: MotionEvent,
    pub event_count: u32,
    pub last_event_ms: u32,
}

/// Everything that happened on one poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollOutcome {
    pub filtered_mm: u32,
    pub wipe: Option<Wipe>,
    pub direction_change: Option<Direction>,
    pub phase_change: Option<(PresencePhase, PresencePhase)>,
    pub event: Option<MotionEvent>,
}

pub struct RangeEngine {
    config: PerceptionConfig,
    window: SampleWindow,
    wipe: WipeDetector,
    classifier: DirectionClassifier,
    presence: PresenceTracker,
    raw_history: RawHistory,
    filtered_mm: u32,
    last_fault: Option<Error>,
    distance_log: ChangeGate<u32>,
}

/// One reading from `source`, with port failures lifted into [`Error`].
fn read_raw(source: &mut impl RangePort) -> error::Result<u32> {
    Ok(source.poll_raw_distance()?)
}

impl RangeEngine {
    pub fn new(config: PerceptionConfig) -> Self {
        let config = config.normalized();
        info!(
            "RangeEngine: band {}..={} mm, max {} mm, window {}, interval {} ms, mode {:?}",
            config.min_distance_mm,
            config.detection_threshold_mm,
            config.max_distance_mm,
            config.sample_window_size,
            config.sample_interval_ms,
            config.direction_trigger_mode
        );
        Self {
            window: SampleWindow::new(config.sample_window_size),
            wipe: WipeDetector::new(),
            classifier: DirectionClassifier::new(
                config.direction_sensitivity_mm,
                config.required_stable_samples(),
            ),
            presence: PresenceTracker::new(),
            raw_history: RawHistory::new(),
            filtered_mm: 0,
            last_fault: None,
            distance_log: ChangeGate::new(),
            config,
        }
    }

    // ── Polling ───────────────────────────────────────────────

    /// Read one distance from `source` and run a full update.
    pub fn poll(&mut self, source: &mut impl RangePort, now_ms: u32) -> PollOutcome {
        let raw = match read_raw(source) {
            Ok(mm) => mm,
            Err(e) => {
                debug!("Range source: {e}");
                self.last_fault = Some(e);
                0
            }
        };
        self.update(raw, now_ms)
    }

    /// Run a full update with one raw reading (0 = no valid reading).
    pub fn update(&mut self, raw: u32, now_ms: u32) -> PollOutcome {
        let mut out = PollOutcome::default();
        let valid = raw != 0 && raw <= self.config.max_distance_mm;
        self.raw_history.record(raw, valid);

        let previous = self.filtered_mm;
        let direction_before = self.direction();

        // 1. Wipe check, before the sample reaches the window.
        let wipe = if valid {
            self.wipe.check(raw, previous, &self.config)
        } else {
            None
        };

        // 2. Window.
        if let Some(w) = wipe {
            self.window.reset_with_value(w.value_mm);
            if self.config.direction_enabled {
                let skip = (2 * self.window.size()) as u16;
                self.classifier.force_confirmed(w.direction, skip);
                if w.direction != direction_before {
                    out.direction_change = Some(w.direction);
                }
            }
            out.wipe = Some(w);
        } else {
            if valid {
                self.wipe.record(raw);
            }
            self.window.ingest_reading(raw, self.config.max_distance_mm);
        }
        self.filtered_mm = self.window.median();
        out.filtered_mm = self.filtered_mm;
        if let Some(mm) = self.distance_log.changed(self.filtered_mm) {
            debug!("Filtered distance: {} mm (raw {})", mm, raw);
        }

        // 3. Direction.
        if self.config.direction_enabled && wipe.is_none() && self.window.is_filled() {
            out.direction_change = self.classifier.update(previous, self.filtered_mm);
        }

        // 4. Presence.
        let input = PresenceInput {
            raw_mm: valid.then_some(raw),
            filtered_mm: self.filtered_mm,
            previous_filtered_mm: previous,
            window_filled: self.window.is_filled(),
            window_spread_mm: self.window.spread(),
            reseeded: wipe.is_some(),
            direction: self.direction(),
            recent: self.wipe.recent(),
            now_ms,
        };
        let presence = self.presence.update(&input, &self.config);
        out.phase_change = presence.phase_change;
        out.event = presence.event;
        out
    }

    // ── Outputs ───────────────────────────────────────────────

    pub fn filtered_distance(&self) -> u32 {
        self.filtered_mm
    }

    pub fn direction(&self) -> Direction {
        if self.config.direction_enabled {
            self.classifier.direction()
        } else {
            Direction::Unknown
        }
    }

    pub fn is_object_detected(&self) -> bool {
        self.presence.is_detected()
    }

    pub fn last_event(&self) -> MotionEvent {
        self.presence.last_event()
    }

    pub fn event_count(&self) -> u32 {
        self.presence.event_count()
    }

    pub fn last_event_ms(&self) -> u32 {
        self.presence.last_event_ms()
    }

    pub fn phase(&self) -> PresencePhase {
        self.presence.phase()
    }

    pub fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    pub fn raw_history(&self) -> &RawHistory {
        &self.raw_history
    }

    pub fn wipe_count(&self) -> u32 {
        self.wipe.wipe_count()
    }

    /// Most recent range-source failure, if any poll has failed.
    pub fn last_fault(&self) -> Option<Error> {
        self.last_fault
    }

    /// Consecutive classifications the direction debounce currently needs.
    pub fn required_stable_samples(&self) -> u8 {
        self.classifier.required_stable()
    }

    pub fn status(&self) -> SensorStatus {
        SensorStatus {
            filtered_mm: self.filtered_mm,
            direction: self.direction(),
            object_detected: self.is_object_detected(),
            phase: self.phase(),
            last_event: self.last_event(),
            event_count: self.event_count(),
            last_event_ms: self.last_event_ms(),
        }
    }

    // ── Configuration ─────────────────────────────────────────

    /// Resize the median window. A change resets window occupancy, the
    /// short-term buffer, direction debounce and the presence phase.
    pub fn set_sample_window_size(&mut self, size: u8) {
        if !self.window.resize(size) {
            return;
        }
        self.config.sample_window_size = self.window.size() as u8;
        self.filtered_mm = 0;
        self.wipe.clear();
        self.classifier.reset();
        self.presence.reset_phase();
        self.distance_log.reset();
        info!("Sample window resized to {}", self.window.size());
    }

    pub fn set_detection_threshold(&mut self, threshold_mm: u32) {
        self.config.detection_threshold_mm = threshold_mm;
        self.config = self.config.clone().normalized();
    }

    pub fn set_distance_range(&mut self, min_mm: u32, max_mm: u32) {
        self.config.min_distance_mm = min_mm;
        self.config.max_distance_mm = max_mm;
        self.config = self.config.clone().normalized();
    }

    pub fn set_direction_sensitivity(&mut self, sensitivity_mm: u32) {
        self.config.direction_sensitivity_mm = sensitivity_mm;
        self.classifier.set_sensitivity(sensitivity_mm);
    }

    pub fn set_trigger_mode(&mut self, mode: TriggerMode) {
        self.config.direction_trigger_mode = mode;
    }

    pub fn set_sample_interval(&mut self, interval_ms: u32) {
        self.config.sample_interval_ms = interval_ms.max(1);
        self.classifier
            .set_required_stable(self.config.required_stable_samples());
    }

    pub fn set_direction_stability(&mut self, stability_ms: u32) {
        self.config.direction_stability_ms = stability_ms;
        self.classifier
            .set_required_stable(self.config.required_stable_samples());
    }

    /// Enable or disable direction classification. Disabling drops all
    /// debounce state; direction then reads `Unknown`.
    pub fn set_direction_detection(&mut self, enabled: bool) {
        if self.config.direction_enabled == enabled {
            return;
        }
        self.config.direction_enabled = enabled;
        self.classifier.reset();
        info!("Direction detection {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Replace the whole configuration, applying each field through its
    /// setter so resets happen exactly where a single change would cause them.
    pub fn apply_config(&mut self, config: PerceptionConfig) {
        let config = config.normalized();
        self.set_sample_window_size(config.sample_window_size);
        self.set_direction_detection(config.direction_enabled);
        self.set_direction_sensitivity(config.direction_sensitivity_mm);
        self.config.direction_stability_ms = config.direction_stability_ms;
        self.set_sample_interval(config.sample_interval_ms);
        self.config = config;
    }
}
