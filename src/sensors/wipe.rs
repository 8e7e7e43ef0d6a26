//! Fast-reset ("wipe") detector.
//!
//! An N-sample median lags a step change by up to N/2 samples. When a raw
//! reading lands inside the warning band while the filtered estimate is
//! still outside it, and the two differ by more than the hysteresis margin,
//! the detector asks the engine to re-seed the window with the raw value so
//! the estimate converges on the same poll.
//!
//! The detector also owns the 3-entry short-term raw buffer used by the
//! presence state machine.

use log::info;

use super::direction::Direction;
use crate::config::{PRESENCE_BUFFER_SIZE, PerceptionConfig};

/// Outcome of a fired wipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wipe {
    /// Value the window is re-seeded with.
    pub value_mm: u32,
    /// Filtered distance before the wipe.
    pub previous_mm: u32,
    /// Direction implied by the jump, asserted as confirmed.
    pub direction: Direction,
}

pub struct WipeDetector {
    recent: [u32; PRESENCE_BUFFER_SIZE],
    head: usize,
    count: usize,
    wipes: u32,
}

impl Default for WipeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl WipeDetector {
    pub fn new() -> Self {
        Self {
            recent: [0; PRESENCE_BUFFER_SIZE],
            head: 0,
            count: 0,
            wipes: 0,
        }
    }

    /// Total wipes fired since construction.
    pub fn wipe_count(&self) -> u32 {
        self.wipes
    }

    /// Evaluate a raw reading against the current filtered estimate.
    ///
    /// Must run before the reading is folded into the window. On a wipe the
    /// short-term buffer is forced to `raw`; the caller applies the rest.
    pub fn check(&mut self, raw: u32, filtered: u32, config: &PerceptionConfig) -> Option<Wipe> {
        let raw_in_band = config.in_warning_band(raw);
        let filtered_outside = filtered == 0 || filtered > config.detection_threshold_mm;
        let gap = i64::from(filtered) - i64::from(raw);
        if !(raw_in_band && filtered_outside && gap > i64::from(config.wipe_hysteresis_mm)) {
            return None;
        }

        self.recent = [raw; PRESENCE_BUFFER_SIZE];
        self.head = 0;
        self.count = PRESENCE_BUFFER_SIZE;
        self.wipes = self.wipes.saturating_add(1);

        let direction = Direction::from_delta(
            i64::from(raw) - i64::from(filtered),
            config.direction_sensitivity_mm,
        );
        info!(
            "Wipe: raw {} mm inside band, filtered {} mm (gap {} mm) -> {:?}",
            raw, filtered, gap, direction
        );
        Some(Wipe {
            value_mm: raw,
            previous_mm: filtered,
            direction,
        })
    }

    /// Record a valid raw reading in the short-term buffer.
    pub fn record(&mut self, raw: u32) {
        self.recent[self.head] = raw;
        self.head = (self.head + 1) % PRESENCE_BUFFER_SIZE;
        if self.count < PRESENCE_BUFFER_SIZE {
            self.count += 1;
        }
    }

    pub fn clear(&mut self) {
        self.recent = [0; PRESENCE_BUFFER_SIZE];
        self.head = 0;
        self.count = 0;
    }

    /// Short-term buffer oldest-first, or `None` until it holds
    /// [`PRESENCE_BUFFER_SIZE`] readings.
    pub fn recent(&self) -> Option<[u32; PRESENCE_BUFFER_SIZE]> {
        if self.count < PRESENCE_BUFFER_SIZE {
            return None;
        }
        let mut ordered = [0; PRESENCE_BUFFER_SIZE];
        for (i, slot) in ordered.iter_mut().enumerate() {
            *slot = self.recent[(self.head + i) % PRESENCE_BUFFER_SIZE];
        }
        Some(ordered)
    }
}
