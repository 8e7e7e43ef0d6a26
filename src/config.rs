//! Perception configuration parameters
//!
//! All tunable parameters for the range-perception core. Values are
//! supplied once at construction by the owning driver; some of them can be
//! changed at runtime through [`PerceptionCommand`](crate::app::commands::PerceptionCommand).
//! Out-of-range values are clamped by [`PerceptionConfig::normalized`], never rejected.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Compile-time capacities (sized for the real-time budget)
// ---------------------------------------------------------------------------

/// Smallest accepted sample window.
pub const MIN_SAMPLE_WINDOW_SIZE: usize = 3;
/// Largest accepted sample window; also the ring buffer's backing capacity.
pub const MAX_SAMPLE_WINDOW_SIZE: usize = 20;
/// Number of filtered-distance deltas kept for median direction sensing.
pub const DELTA_HISTORY_SIZE: usize = 5;
/// Short-term raw buffer used for presence tracking and wipe re-seeding.
pub const PRESENCE_BUFFER_SIZE: usize = 3;
/// Raw readings retained for diagnostics.
pub const RAW_HISTORY_SIZE: usize = 16;
/// Consecutive in-band raw samples that assert a sudden appearance.
pub const SUDDEN_APPEARANCE_SAMPLES: u8 = 3;
/// Stuck-state guard: active presence phases fall back to neutral after this.
pub const PRESENCE_TIMEOUT_MS: u32 = 5000;

// ---------------------------------------------------------------------------
// Trigger mode
// ---------------------------------------------------------------------------

/// Which motion directions are considered hazard-worthy.
///
/// Persisted as its raw `u8`. Unrecognized values decode to [`TriggerMode::Any`],
/// which accepts every direction. That fallback is suspect (it silently turns
/// a corrupt setting into the most permissive policy) but is kept for
/// compatibility with deployed configuration stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum TriggerMode {
    ApproachingOnly,
    RecedingOnly,
    Both,
    /// Fallback for unrecognized raw values. Carries the original value so it
    /// round-trips unchanged.
    Any(u8),
}

impl TriggerMode {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::ApproachingOnly,
            1 => Self::RecedingOnly,
            2 => Self::Both,
            other => {
                warn!("Unrecognized trigger mode {other}, accepting any direction");
                Self::Any(other)
            }
        }
    }

    pub fn as_raw(self) -> u8 {
        match self {
            Self::ApproachingOnly => 0,
            Self::RecedingOnly => 1,
            Self::Both => 2,
            Self::Any(raw) => raw,
        }
    }
}

impl From<u8> for TriggerMode {
    fn from(raw: u8) -> Self {
        Self::from_raw(raw)
    }
}

impl From<TriggerMode> for u8 {
    fn from(mode: TriggerMode) -> Self {
        mode.as_raw()
    }
}

// ---------------------------------------------------------------------------
// PerceptionConfig
// ---------------------------------------------------------------------------

/// Static configuration for one physical range sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceptionConfig {
    // --- Range ---
    /// Minimum valid detection distance (mm)
    pub min_distance_mm: u32,
    /// Sensor hardware maximum (mm); raw readings above this are invalid
    pub max_distance_mm: u32,
    /// Upper edge of the warning band (mm)
    pub detection_threshold_mm: u32,

    // --- Filtering ---
    /// Median window length in samples
    pub sample_window_size: u8,
    /// Raw vs filtered gap (mm) required before a wipe fires
    pub wipe_hysteresis_mm: u32,
    /// Maximum window spread (mm) for readings to count as consistent
    pub consistency_spread_mm: u32,
    /// Movement velocity constant; movement threshold per sample is
    /// `sample_interval_ms * movement_speed_mm_per_s / 1000`.
    ///
    /// Defaults to 2.5 mm/ms (a brisk walk), not the 25 mm/ms figure quoted
    /// for older firmware: at a 60 ms interval that would demand 1.5 m of
    /// travel per poll and movement would never register.
    pub movement_speed_mm_per_s: u32,

    // --- Direction ---
    /// Enable direction classification and direction-gated triggering
    pub direction_enabled: bool,
    /// Minimum median delta (mm) that counts as directional movement
    pub direction_sensitivity_mm: u32,
    /// Time a classification must persist before it is confirmed (ms)
    pub direction_stability_ms: u32,
    /// Which directions may trigger a detection
    pub direction_trigger_mode: TriggerMode,

    // --- Timing ---
    /// Poll interval of the owning driver loop (ms)
    pub sample_interval_ms: u32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            // Range
            min_distance_mm: 20,
            max_distance_mm: 4000,
            detection_threshold_mm: 1500,

            // Filtering
            sample_window_size: 5,
            wipe_hysteresis_mm: 200,
            consistency_spread_mm: 100,
            movement_speed_mm_per_s: 2500, // 2.5 mm/ms

            // Direction
            direction_enabled: true,
            direction_sensitivity_mm: 20,
            direction_stability_ms: 180,
            direction_trigger_mode: TriggerMode::ApproachingOnly,

            // Timing
            sample_interval_ms: 60, // ultrasonic echo settle time
        }
    }
}

impl PerceptionConfig {
    /// Parse a JSON configuration blob and normalize it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed configuration"))?;
        Ok(config.normalized())
    }

    /// Encode as a compact postcard record for the settings store.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        postcard::to_allocvec(self).map_err(|_| Error::Config("encode failed"))
    }

    /// Decode a postcard record written by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let config: Self =
            postcard::from_bytes(bytes).map_err(|_| Error::Config("corrupt settings record"))?;
        Ok(config.normalized())
    }

    /// Clamp every field into its operating range.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.sample_window_size = clamp_window_size(self.sample_window_size);
        self.sample_interval_ms = self.sample_interval_ms.max(1);
        if self.max_distance_mm < self.min_distance_mm {
            warn!(
                "max distance {} below min {}, raising to min",
                self.max_distance_mm, self.min_distance_mm
            );
            self.max_distance_mm = self.min_distance_mm;
        }
        self.detection_threshold_mm = self
            .detection_threshold_mm
            .clamp(self.min_distance_mm, self.max_distance_mm);
        self
    }

    /// Consecutive identical classifications needed to confirm a direction.
    pub fn required_stable_samples(&self) -> u8 {
        let interval = self.sample_interval_ms.max(1);
        let samples = self.direction_stability_ms.div_ceil(interval);
        samples.clamp(2, u32::from(u8::MAX)) as u8
    }

    /// Minimum filtered-distance change per sample that counts as movement.
    pub fn movement_threshold_mm(&self) -> u32 {
        let scaled = u64::from(self.sample_interval_ms) * u64::from(self.movement_speed_mm_per_s);
        (scaled / 1000).min(u64::from(u32::MAX)) as u32
    }

    /// True if `distance` lies inside `[min_distance, detection_threshold]`.
    pub fn in_warning_band(&self, distance: u32) -> bool {
        distance > 0 && distance >= self.min_distance_mm && distance <= self.detection_threshold_mm
    }
}

/// Clamp a requested window size to `[MIN_SAMPLE_WINDOW_SIZE, MAX_SAMPLE_WINDOW_SIZE]`.
pub fn clamp_window_size(size: u8) -> u8 {
    let clamped = (size as usize).clamp(MIN_SAMPLE_WINDOW_SIZE, MAX_SAMPLE_WINDOW_SIZE) as u8;
    if clamped != size {
        warn!("sample window size {size} clamped to {clamped}");
    }
    clamped
}
