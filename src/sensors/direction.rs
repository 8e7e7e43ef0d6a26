//! Direction classifier.
//!
//! Tracks deltas between successive filtered distances, median-filters them
//! over a short history and debounces the resulting classification:
//!
//! ```text
//!  delta ──▶ DeltaHistory ──▶ median ──▶ classify ──▶ candidate/count ──▶ confirmed
//! ```
//!
//! A classification becomes visible only after it has been produced
//! `required_stable` times in a row. After a wipe the classifier is told to
//! ignore a number of updates, because a uniformly re-seeded window yields
//! zero deltas that would otherwise read as "stationary".

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::window::insertion_sort;
use crate::config::DELTA_HISTORY_SIZE;

/// Movement direction relative to the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    #[default]
    Unknown = 0,
    Stationary = 1,
    /// Distance shrinking.
    Approaching = 2,
    /// Distance growing.
    Receding = 3,
}

impl Direction {
    /// Classify a signed distance change against a dead band.
    pub fn from_delta(delta_mm: i64, sensitivity_mm: u32) -> Self {
        if delta_mm.unsigned_abs() < u64::from(sensitivity_mm) {
            Self::Stationary
        } else if delta_mm < 0 {
            Self::Approaching
        } else {
            Self::Receding
        }
    }
}

/// Fixed-capacity ring of signed filtered-distance deltas.
struct DeltaHistory {
    ring: [i64; DELTA_HISTORY_SIZE],
    head: usize,
    count: usize,
}

impl DeltaHistory {
    const fn new() -> Self {
        Self {
            ring: [0; DELTA_HISTORY_SIZE],
            head: 0,
            count: 0,
        }
    }

    fn push(&mut self, delta: i64) {
        self.ring[self.head] = delta;
        self.head = (self.head + 1) % DELTA_HISTORY_SIZE;
        if self.count < DELTA_HISTORY_SIZE {
            self.count += 1;
        }
    }

    fn clear(&mut self) {
        *self = Self::new();
    }

    fn median(&self) -> i64 {
        let mut sorted = self.ring;
        let sorted = &mut sorted[..self.count];
        insertion_sort(sorted);
        let mid = self.count / 2;
        if self.count % 2 == 1 {
            sorted[mid]
        } else {
            (sorted[mid - 1] + sorted[mid]) / 2
        }
    }
}

pub struct DirectionClassifier {
    history: DeltaHistory,
    candidate: Direction,
    stable_count: u8,
    confirmed: Direction,
    required_stable: u8,
    sensitivity_mm: u32,
    /// Updates left to ignore after a wipe.
    skip_updates: u16,
}

impl DirectionClassifier {
    pub fn new(sensitivity_mm: u32, required_stable: u8) -> Self {
        Self {
            history: DeltaHistory::new(),
            candidate: Direction::Unknown,
            stable_count: 0,
            confirmed: Direction::Unknown,
            required_stable: required_stable.max(2),
            sensitivity_mm,
            skip_updates: 0,
        }
    }

    /// Externally visible (confirmed) direction.
    pub fn direction(&self) -> Direction {
        self.confirmed
    }

    pub fn candidate(&self) -> Direction {
        self.candidate
    }

    pub fn stable_count(&self) -> u8 {
        self.stable_count
    }

    pub fn required_stable(&self) -> u8 {
        self.required_stable
    }

    pub fn skip_remaining(&self) -> u16 {
        self.skip_updates
    }

    pub fn set_sensitivity(&mut self, sensitivity_mm: u32) {
        self.sensitivity_mm = sensitivity_mm;
    }

    pub fn set_required_stable(&mut self, required_stable: u8) {
        self.required_stable = required_stable.max(2);
        self.stable_count = self.stable_count.min(self.required_stable);
    }

    /// Drop all debounce state and return to `Unknown`.
    pub fn reset(&mut self) {
        self.history.clear();
        self.candidate = Direction::Unknown;
        self.stable_count = 0;
        self.confirmed = Direction::Unknown;
        self.skip_updates = 0;
    }

    /// Assert `direction` as already confirmed and ignore the next
    /// `skip_updates` calls to [`update`](Self::update).
    pub fn force_confirmed(&mut self, direction: Direction, skip_updates: u16) {
        self.history.clear();
        self.candidate = direction;
        self.confirmed = direction;
        self.stable_count = self.required_stable;
        self.skip_updates = skip_updates;
        info!("Direction forced: {:?} (ignoring {} updates)", direction, skip_updates);
    }

    /// Feed one pair of consecutive filtered distances.
    ///
    /// Returns the newly confirmed direction when it changed on this update.
    pub fn update(&mut self, previous_mm: u32, current_mm: u32) -> Option<Direction> {
        if previous_mm == 0 || current_mm == 0 {
            let changed = self.confirmed != Direction::Unknown;
            self.reset();
            return changed.then_some(Direction::Unknown);
        }

        if self.skip_updates > 0 {
            self.skip_updates -= 1;
            return None;
        }

        let delta = i64::from(current_mm) - i64::from(previous_mm);
        self.history.push(delta);
        let median_delta = if self.history.count >= 3 {
            self.history.median()
        } else {
            delta
        };
        let classified = Direction::from_delta(median_delta, self.sensitivity_mm);
        debug!(
            "Direction sample: delta={} median={} -> {:?}",
            delta, median_delta, classified
        );

        if classified != self.candidate {
            self.candidate = classified;
            self.stable_count = 1;
            return None;
        }

        if self.stable_count < self.required_stable {
            self.stable_count += 1;
        }
        if self.stable_count >= self.required_stable && classified != self.confirmed {
            info!(
                "Direction confirmed: {:?} -> {:?} (median delta {} mm)",
                self.confirmed, classified, median_delta
            );
            self.confirmed = classified;
            return Some(classified);
        }
        None
    }
}
